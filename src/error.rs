//! Error types for the pdf2png library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — failures raised by individual pipeline steps
//!   (rasterisation, image persistence, directory creation, configuration
//!   I/O). Only a handful of these are fatal to a whole run — the batch
//!   layer decides; see the taxonomy below.
//!
//! * [`PageRangeError`] — a page-selection expression did not resolve
//!   against a document's page count. Always scoped to one document: the
//!   document is skipped and the batch continues.
//!
//! Containment policy, from widest to narrowest blast radius:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | output root cannot be created, internal panic | run aborts, status `error` |
//! | metadata probe, zero pages, bad page expression, effective dir | document skipped |
//! | rasterise or save of one page | page skipped, document continues |
//! | unknown template field, invalid regex, path collision | warning + safe fallback |

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by pipeline steps.
///
/// The batch layer maps each variant onto the containment policy above;
/// none of them escapes [`crate::batch::BatchRunner::run`] as an `Err` —
/// they end up in the event trail and, for run-fatal cases, in the
/// summary's `error` status.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input file or directory does not exist.
    #[error("input path not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// A directory (output root or a mirrored subdirectory) could not be created.
    #[error("failed to create output directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rasterizer could not report a page count (corrupt or unreadable file).
    #[error("failed to read page count of '{path}': {detail}")]
    MetadataFailed { path: PathBuf, detail: String },

    /// The document opened but reports zero pages.
    #[error("document '{path}' reports zero pages")]
    EmptyDocument { path: PathBuf },

    /// The rasterizer failed on one specific page.
    #[error("rasterisation failed for page {page} of '{path}': {detail}")]
    RasterizeFailed {
        path: PathBuf,
        page: u32,
        detail: String,
    },

    /// The rendered image could not be written as PNG.
    #[error("failed to write image '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Request validation failed at build time.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A persisted configuration file could not be read or parsed.
    #[error("failed to load configuration from '{path}': {detail}")]
    ConfigLoadFailed { path: PathBuf, detail: String },

    /// A configuration file could not be written.
    #[error("failed to save configuration to '{path}': {source}")]
    ConfigSaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error (e.g. a panicked worker task).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A page-selection expression failed to resolve.
///
/// The whole expression fails atomically: no partial page set is ever
/// returned (see [`crate::pipeline::pages::resolve_pages`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    /// A token was not an integer or a `start-end` range.
    #[error("invalid page token '{token}'")]
    InvalidToken { token: String },

    /// A page number or range endpoint fell outside `[1, total]`.
    #[error("page {page} is out of range (document has {total} pages)")]
    OutOfRange { page: u32, total: u32 },

    /// A range ran backwards.
    #[error("invalid page range {start}-{end}: start must be <= end")]
    BackwardsRange { start: u32, end: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let e = PageRangeError::OutOfRange { page: 6, total: 5 };
        let msg = e.to_string();
        assert!(msg.contains('6'), "got: {msg}");
        assert!(msg.contains("5 pages"), "got: {msg}");
    }

    #[test]
    fn backwards_range_display() {
        let e = PageRangeError::BackwardsRange { start: 2, end: 1 };
        assert!(e.to_string().contains("2-1"));
    }

    #[test]
    fn rasterize_failed_carries_page_context() {
        let e = ConvertError::RasterizeFailed {
            path: PathBuf::from("a.pdf"),
            page: 3,
            detail: "engine error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"));
        assert!(msg.contains("a.pdf"));
    }
}
