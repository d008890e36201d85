//! Per-document conversion: one PDF in, a list of produced PNG paths out.
//!
//! The engine never returns an error. Every failure below the run level is
//! contained here — a bad document skips the document, a bad page skips the
//! page — and each skip is emitted to the event sink with enough context
//! (document, page, reason) to reconstruct what happened afterwards.
//!
//! Cancellation is polled at the two checkpoints the pipeline guarantees:
//! once after the metadata probe and once before each page. An in-flight
//! page render is never interrupted.

use crate::cancel::CancelToken;
use crate::config::ConversionRequest;
use crate::events::{EventSink, LogEvent, Severity, SharedSink};
use crate::pipeline::naming::{plan_filename, resolve_collision};
use crate::pipeline::pages::resolve_pages;
use crate::pipeline::postprocess::{apply_transforms, save_png};
use crate::pipeline::raster::Rasterizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Converts a single document according to a [`ConversionRequest`].
///
/// Cheap to clone; the rasterizer and sink are shared.
#[derive(Clone)]
pub struct ConversionEngine {
    rasterizer: Arc<dyn Rasterizer>,
    sink: SharedSink,
}

impl ConversionEngine {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, sink: SharedSink) -> Self {
        Self { rasterizer, sink }
    }

    /// Convert one document, returning the paths actually produced (or, in
    /// dry-run mode, planned). An empty result means the document was
    /// skipped or stopped; the event trail says why.
    ///
    /// `output_root` is the run's resolved output root and `input_root` the
    /// top of the input tree — both computed once per run by the batch
    /// layer.
    pub fn convert_document(
        &self,
        document: &Path,
        request: &ConversionRequest,
        output_root: &Path,
        input_root: &Path,
        cancel: &CancelToken,
    ) -> Vec<PathBuf> {
        let mut produced = Vec::new();

        // ── Metadata probe ───────────────────────────────────────────────
        let total_pages = match self.rasterizer.page_count(document) {
            Ok(0) => {
                self.doc_event(
                    Severity::Warning,
                    document,
                    "document reports zero pages (corrupt or non-standard PDF); skipped",
                );
                return produced;
            }
            Ok(n) => n,
            Err(e) => {
                self.doc_event(
                    Severity::Error,
                    document,
                    format!("failed to read document info: {e}; skipped"),
                );
                return produced;
            }
        };

        if cancel.is_cancelled() {
            return produced;
        }

        // ── Page-set resolution ──────────────────────────────────────────
        let pages = match resolve_pages(&request.pages, total_pages) {
            Ok(pages) => pages,
            Err(e) => {
                self.doc_event(
                    Severity::Error,
                    document,
                    format!("page expression '{}' did not resolve: {e}; skipped", request.pages),
                );
                return produced;
            }
        };

        // ── Effective output directory ───────────────────────────────────
        let output_dir = self.effective_output_dir(document, request, output_root, input_root);

        if request.dry_run {
            self.doc_event(
                Severity::Info,
                document,
                format!(
                    "[dry-run] output directory {} '{}'",
                    if output_dir.exists() { "already exists:" } else { "would be created:" },
                    output_dir.display()
                ),
            );
        } else if let Err(e) = std::fs::create_dir_all(&output_dir) {
            self.doc_event(
                Severity::Error,
                document,
                format!(
                    "cannot create output directory '{}': {e}; document skipped",
                    output_dir.display()
                ),
            );
            return produced;
        }

        // ── Page loop ────────────────────────────────────────────────────
        for page_num in pages {
            if cancel.is_cancelled() {
                self.doc_event(
                    Severity::Info,
                    document,
                    "stop requested; remaining pages abandoned",
                );
                break;
            }

            let filename = plan_filename(
                &request.filename_template,
                document,
                page_num,
                total_pages,
                request.dpi,
                &request.prefix,
                Some(input_root),
                self.sink.as_ref(),
            );
            let mut target = output_dir.join(filename);

            if !request.overwrite && target.exists() {
                let resolved = resolve_collision(&target);
                self.page_event(
                    Severity::Warning,
                    document,
                    page_num,
                    format!(
                        "'{}' already exists; saving as '{}'",
                        target.display(),
                        resolved.display()
                    ),
                );
                target = resolved;
            }

            if request.dry_run {
                self.page_event(
                    Severity::Info,
                    document,
                    page_num,
                    format!(
                        "[dry-run] would convert page {page_num}/{total_pages} -> '{}'",
                        target.display()
                    ),
                );
                produced.push(target);
                continue;
            }

            let image = match self
                .rasterizer
                .rasterize_page(document, page_num, request.dpi)
            {
                Ok(image) => image,
                Err(e) => {
                    self.page_event(
                        Severity::Error,
                        document,
                        page_num,
                        format!("{e}; page skipped"),
                    );
                    continue;
                }
            };

            let image = apply_transforms(image, request.grayscale, request.rotation);

            match save_png(&image, &target) {
                Ok(()) => {
                    self.page_event(
                        Severity::Info,
                        document,
                        page_num,
                        format!("saved '{}'", target.display()),
                    );
                    produced.push(target);
                }
                Err(e) => {
                    self.page_event(
                        Severity::Error,
                        document,
                        page_num,
                        format!("{e}; page skipped"),
                    );
                }
            }
        }

        produced
    }

    /// `output_root`, plus the document's subdirectory relative to
    /// `input_root` when structure mirroring is on. A document outside the
    /// input root cannot be mirrored and lands in the root with a warning.
    fn effective_output_dir(
        &self,
        document: &Path,
        request: &ConversionRequest,
        output_root: &Path,
        input_root: &Path,
    ) -> PathBuf {
        if !request.preserve_structure {
            return output_root.to_path_buf();
        }
        let Some(parent) = document.parent() else {
            return output_root.to_path_buf();
        };
        if parent == input_root {
            return output_root.to_path_buf();
        }
        match parent.strip_prefix(input_root) {
            Ok(relative) => output_root.join(relative),
            Err(_) => {
                self.doc_event(
                    Severity::Warning,
                    document,
                    format!(
                        "cannot mirror directory structure: document is not under '{}'",
                        input_root.display()
                    ),
                );
                output_root.to_path_buf()
            }
        }
    }

    fn doc_event(&self, severity: Severity, document: &Path, message: impl Into<String>) {
        self.sink
            .emit(LogEvent::new(severity, message).with_document(document));
    }

    fn page_event(
        &self,
        severity: Severity,
        document: &Path,
        page: u32,
        message: impl Into<String>,
    ) {
        self.sink.emit(
            LogEvent::new(severity, message)
                .with_document(document)
                .with_page(page),
        );
    }
}
