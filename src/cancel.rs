//! Cooperative cancellation for a running batch.
//!
//! Cancellation is advisory and polled, never preemptive: the worker checks
//! the token before starting each document and before starting each page, so
//! one in-flight page render always completes after a stop request. That is
//! a bounded-latency trade-off the pipeline makes deliberately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared stop flag, scoped to one run.
///
/// Clones share the same underlying flag. The orchestrator that owns the
/// run calls [`CancelToken::reset`] before starting and hands clones to
/// whatever may request a stop (a Ctrl-C handler, a GUI button, an HTTP
/// route).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Poll the flag. Checked at document and page boundaries only.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can serve a fresh run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
