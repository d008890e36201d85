//! Result types for a batch run.

use serde::Serialize;
use std::path::PathBuf;

/// Final disposition of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every discovered document was attempted.
    Completed,
    /// A stop request was observed; the run ended early.
    Stopped,
    /// Discovery matched no documents. A warning, not an error.
    NoInput,
    /// A run-fatal failure (output root, internal panic) aborted the batch.
    Error,
}

/// Aggregated outcome of one batch run.
///
/// Created empty when the batch starts, filled incrementally as documents
/// finish, frozen when the run ends or is stopped. Counts are consistent
/// with what was actually attempted: skipped documents and pages are never
/// counted as successes.
///
/// Which single path to *report* to the user (the one image, or the output
/// root) is a presentation decision; the summary exposes both the full
/// produced-path list and the root so the caller can apply its own policy.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Documents that passed discovery filters and entered the batch.
    pub documents_scanned: usize,
    /// Documents for which at least one page was produced (or planned).
    pub documents_with_output: usize,
    /// Total images produced, or planned in dry-run mode.
    pub images_produced: usize,
    /// Absolute paths of every produced (or planned) image, in order.
    pub produced_paths: Vec<PathBuf>,
    /// The resolved output root for the run.
    pub output_root: PathBuf,
    /// Whether this was a dry run (paths planned, nothing written).
    pub dry_run: bool,
}

impl RunSummary {
    /// An empty summary for a run that is about to start.
    pub(crate) fn empty(output_root: PathBuf, dry_run: bool) -> Self {
        Self {
            status: RunStatus::Completed,
            documents_scanned: 0,
            documents_with_output: 0,
            images_produced: 0,
            produced_paths: Vec::new(),
            output_root,
            dry_run,
        }
    }

    /// Fold one document's produced paths into the accumulators.
    pub(crate) fn absorb_document(&mut self, produced: Vec<PathBuf>) {
        if !produced.is_empty() {
            self.documents_with_output += 1;
            self.images_produced += produced.len();
            self.produced_paths.extend(produced);
        }
    }
}
