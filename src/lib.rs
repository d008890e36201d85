//! # pdf2png
//!
//! Batch-convert PDF documents into PNG images.
//!
//! Point the pipeline at a file or a directory tree, select pages with an
//! expression like `first`, `all` or `1,3-5`, and get one PNG per selected
//! page — optionally grayscaled, rotated, renamed through a filename
//! template, and laid out to mirror the input directory structure.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input path
//!  │
//!  ├─ 1. Discover  walk the tree, apply include/exclude/regex filters
//!  ├─ 2. Resolve   page expression × page count → concrete page set
//!  ├─ 3. Plan      filename template + collision-safe output path
//!  ├─ 4. Raster    decode one page via pdfium (blocking, spawn_blocking)
//!  ├─ 5. Polish    grayscale / right-angle rotation
//!  └─ 6. Save      PNG per page + aggregated RunSummary
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{run_batch, CancelToken, ConversionRequest, PdfiumRasterizer, TracingSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::builder()
//!         .input_path("./reports")
//!         .pages("all")
//!         .dpi(150)
//!         .recursive(true)
//!         .build()?;
//!
//!     let summary = run_batch(
//!         &request,
//!         Arc::new(PdfiumRasterizer::new()),
//!         Arc::new(TracingSink),
//!         &CancelToken::new(),
//!     )
//!     .await;
//!
//!     println!("{} images -> {}", summary.images_produced, summary.output_root.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Design notes
//!
//! * The conversion pipeline is implemented exactly once, here; every
//!   frontend (CLI, GUI, HTTP shim) is a thin caller of [`run_batch`].
//! * PDF decoding lives behind the [`Rasterizer`] trait — swap in anything
//!   that can count pages and render one page at a DPI. Tests run entire
//!   batches against an in-memory fake.
//! * Observability is a capability: the pipeline emits severity-tagged
//!   [`LogEvent`]s into an injected [`EventSink`] and never formats output
//!   itself.
//! * Stopping is cooperative: a [`CancelToken`] is polled before each
//!   document and each page, so one in-flight page always completes.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2png = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod summary;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_sync, BatchRunner};
pub use cancel::CancelToken;
pub use config::{ConversionRequest, ConversionRequestBuilder, PostExportAction, Rotation};
pub use engine::ConversionEngine;
pub use error::{ConvertError, PageRangeError};
pub use events::{EventSink, EventSinkExt, LogEvent, MemorySink, Severity, SharedSink, TracingSink};
pub use pipeline::raster::{PdfiumRasterizer, Rasterizer};
pub use summary::{RunStatus, RunSummary};
