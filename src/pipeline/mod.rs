//! Pipeline stages for batch PDF-to-PNG conversion.
//!
//! Each submodule implements exactly one step. Keeping stages separate
//! makes each independently testable and lets us swap implementations
//! (e.g. a different rasterization engine) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ discover ──▶ pages ──▶ naming ──▶ raster ──▶ postprocess
//! (path)    (filters)    (ranges)  (template) (pdfium)   (gray/rotate/png)
//! ```
//!
//! 1. [`discover`]    — walk the input location and apply filename filters
//! 2. [`pages`]       — resolve the page-selection expression per document
//! 3. [`naming`]      — derive each output path and dodge collisions
//! 4. [`raster`]      — the external PDF engine behind the [`raster::Rasterizer`] trait
//! 5. [`postprocess`] — grayscale, right-angle rotation, PNG persistence
//!
//! [`crate::engine::ConversionEngine`] threads one document through stages
//! 2–5; [`crate::batch::BatchRunner`] drives the document loop.

pub mod discover;
pub mod naming;
pub mod pages;
pub mod postprocess;
pub mod raster;
