//! Batch orchestration: drive a set of discovered documents through the
//! conversion engine and aggregate the results.
//!
//! ## Concurrency model
//!
//! One batch, one worker. Document conversion is blocking work (pdfium plus
//! filesystem), so [`BatchRunner::run`] pushes each document onto
//! `spawn_blocking` and awaits it — the async caller stays responsive, the
//! documents still run strictly one at a time. `spawn_blocking` also gives
//! the batch its safety net: a panic inside a conversion surfaces as a
//! `JoinError` here, is logged at critical severity, and turns the run
//! status to `error` — it never crosses the pipeline boundary as a panic.
//!
//! At most one batch is expected to run at a time; queueing or rejecting a
//! second start request is the caller's job.

use crate::cancel::CancelToken;
use crate::config::ConversionRequest;
use crate::engine::ConversionEngine;
use crate::error::ConvertError;
use crate::events::{EventSinkExt, SharedSink};
use crate::pipeline::discover::discover_documents;
use crate::pipeline::raster::Rasterizer;
use crate::summary::{RunStatus, RunSummary};
use std::path::PathBuf;
use std::sync::Arc;

/// Iterates a document set through the [`ConversionEngine`] and produces
/// the run's [`RunSummary`].
pub struct BatchRunner {
    engine: ConversionEngine,
    sink: SharedSink,
}

impl BatchRunner {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, sink: SharedSink) -> Self {
        Self {
            engine: ConversionEngine::new(rasterizer, sink.clone()),
            sink,
        }
    }

    /// Run the batch over `documents`, in order.
    ///
    /// Cancellation is checked before each document; observing it at any
    /// checkpoint marks the summary `stopped`. An empty document set is a
    /// warning (`no_input`), not an error. The only run-fatal conditions
    /// are an uncreatable output root and a panicked conversion.
    pub async fn run(
        &self,
        documents: Vec<PathBuf>,
        request: &ConversionRequest,
        cancel: &CancelToken,
    ) -> RunSummary {
        let output_root = request.effective_output_root();
        let input_root = request.input_root();
        let mut summary = RunSummary::empty(output_root.clone(), request.dry_run);
        summary.documents_scanned = documents.len();

        if documents.is_empty() {
            self.sink
                .warn("no PDF documents matched the input path and filters");
            summary.status = RunStatus::NoInput;
            return summary;
        }

        if !request.dry_run {
            if let Err(e) = std::fs::create_dir_all(&output_root) {
                self.sink.error(format!(
                    "cannot create output root '{}': {e}; run aborted",
                    output_root.display()
                ));
                summary.status = RunStatus::Error;
                return summary;
            }
        }
        self.sink.info(format!(
            "{} document(s) queued; images go under '{}'",
            documents.len(),
            output_root.display()
        ));

        for document in documents {
            if cancel.is_cancelled() {
                self.sink.info("stop requested; batch aborted");
                break;
            }

            self.sink
                .info(format!("processing '{}'", document.display()));

            let engine = self.engine.clone();
            let doc = document.clone();
            let req = request.clone();
            let out_root = output_root.clone();
            let in_root = input_root.clone();
            let token = cancel.clone();

            let joined = tokio::task::spawn_blocking(move || {
                engine.convert_document(&doc, &req, &out_root, &in_root, &token)
            })
            .await;

            match joined {
                Ok(produced) => {
                    self.sink.info(format!(
                        "'{}' finished: {} image(s) {}",
                        document.display(),
                        produced.len(),
                        if request.dry_run { "planned" } else { "produced" }
                    ));
                    summary.absorb_document(produced);
                }
                Err(e) => {
                    self.sink.critical(format!(
                        "internal failure while converting '{}': {e}; run aborted",
                        document.display()
                    ));
                    summary.status = RunStatus::Error;
                    return summary;
                }
            }
        }

        summary.status = if cancel.is_cancelled() {
            RunStatus::Stopped
        } else {
            RunStatus::Completed
        };

        self.log_summary(&summary);
        summary
    }

    fn log_summary(&self, summary: &RunSummary) {
        let action = if summary.dry_run { "planned" } else { "produced" };
        self.sink.info(format!(
            "--- {}conversion summary ---",
            if summary.dry_run { "dry-run " } else { "" }
        ));
        self.sink.info(format!(
            "documents scanned (after filters): {}",
            summary.documents_scanned
        ));
        self.sink.info(format!(
            "documents with at least one page handled: {}",
            summary.documents_with_output
        ));
        self.sink
            .info(format!("images {action}: {}", summary.images_produced));
        if summary.images_produced > 0 {
            self.sink.info(format!(
                "all output under root: '{}'",
                summary.output_root.display()
            ));
        }
    }
}

/// Discover and convert in one call: the primary entry point for callers
/// that hold a [`ConversionRequest`] and want a finished [`RunSummary`].
///
/// Never returns an error — run-fatal failures come back as a summary with
/// status `error`, with the reasons in the event trail.
pub async fn run_batch(
    request: &ConversionRequest,
    rasterizer: Arc<dyn Rasterizer>,
    sink: SharedSink,
    cancel: &CancelToken,
) -> RunSummary {
    if !request.input_path.exists() {
        sink.error(format!(
            "input path '{}' does not exist",
            request.input_path.display()
        ));
        let mut summary = RunSummary::empty(request.effective_output_root(), request.dry_run);
        summary.status = RunStatus::Error;
        return summary;
    }

    let discovery = {
        let req = request.clone();
        let sink = sink.clone();
        tokio::task::spawn_blocking(move || {
            discover_documents(
                &req.input_path,
                req.recursive,
                &req.include_keywords,
                &req.exclude_keywords,
                &req.regex_filter,
                sink.as_ref(),
            )
        })
        .await
    };

    let documents = match discovery {
        Ok(documents) => documents,
        Err(e) => {
            sink.critical(format!("internal failure during discovery: {e}"));
            let mut summary = RunSummary::empty(request.effective_output_root(), request.dry_run);
            summary.status = RunStatus::Error;
            return summary;
        }
    };

    BatchRunner::new(rasterizer, sink).run(documents, request, cancel).await
}

/// Synchronous wrapper around [`run_batch`] for callers without a runtime.
///
/// Creates a temporary tokio runtime internally.
pub fn run_batch_sync(
    request: &ConversionRequest,
    rasterizer: Arc<dyn Rasterizer>,
    sink: SharedSink,
    cancel: &CancelToken,
) -> Result<RunSummary, ConvertError> {
    Ok(tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(run_batch(request, rasterizer, sink, cancel)))
}
