//! Structured event sink: the pipeline's only observability channel.
//!
//! The core never prints, never formats for a screen, and never assumes a
//! particular frontend. Everything a user might want to know — skipped
//! documents, collision renames, per-page failures — is emitted as a
//! severity-tagged [`LogEvent`] through an injected [`EventSink`].
//!
//! # Why a sink instead of logging directly?
//!
//! Callers differ in what they do with the trail: a CLI prints it, an HTTP
//! handler returns it in the response body, a GUI appends it to a text pane.
//! A capability trait is the least-invasive integration point — the library
//! knows nothing about how the host application displays events. The default
//! [`TracingSink`] bridges events onto `tracing` so plain library users
//! still get ordinary log output.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Severity of a pipeline event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// One entry in a run's log trail.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub severity: Severity,
    pub message: String,
    /// Document the event concerns, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<PathBuf>,
    /// 1-based page number, for page-scoped events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl LogEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            document: None,
            page: None,
        }
    }

    pub fn with_document(mut self, document: impl AsRef<Path>) -> Self {
        self.document = Some(document.as_ref().to_path_buf());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Receives pipeline events.
///
/// Implementations must be `Send + Sync`: document conversions run on
/// blocking worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Shorthand emitters so call sites read like logging statements.
///
/// Blanket-implemented for every sink, including `dyn EventSink` behind a
/// reference or `Arc`.
pub trait EventSinkExt: EventSink {
    fn debug(&self, message: impl Into<String>) {
        self.emit(LogEvent::new(Severity::Debug, message));
    }

    fn info(&self, message: impl Into<String>) {
        self.emit(LogEvent::new(Severity::Info, message));
    }

    fn warn(&self, message: impl Into<String>) {
        self.emit(LogEvent::new(Severity::Warning, message));
    }

    fn error(&self, message: impl Into<String>) {
        self.emit(LogEvent::new(Severity::Error, message));
    }

    fn critical(&self, message: impl Into<String>) {
        self.emit(LogEvent::new(Severity::Critical, message));
    }
}

impl<T: EventSink + ?Sized> EventSinkExt for T {}

/// Convenience alias for the shared form the pipeline passes around.
pub type SharedSink = Arc<dyn EventSink>;

/// Forwards every event to `tracing` at the matching level.
///
/// This is the sink of choice when the caller has a `tracing` subscriber
/// installed and wants a single unified log stream.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: LogEvent) {
        let doc = event.document.as_deref().map(|d| d.display().to_string());
        let doc = doc.as_deref();
        let critical = event.severity == Severity::Critical;
        match event.severity {
            Severity::Debug => {
                tracing::debug!(document = doc, page = event.page, "{}", event.message)
            }
            Severity::Info => {
                tracing::info!(document = doc, page = event.page, "{}", event.message)
            }
            Severity::Warning => {
                tracing::warn!(document = doc, page = event.page, "{}", event.message)
            }
            // tracing has no level above ERROR; critical events keep their
            // severity in a structured field instead.
            Severity::Error | Severity::Critical => tracing::error!(
                document = doc,
                page = event.page,
                critical,
                "{}",
                event.message
            ),
        }
    }
}

/// Collects events in memory so a caller can hand back the full log trail
/// (an HTTP response body, a test assertion).
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }

    /// Drain the trail, leaving the sink empty for the next run.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.events.lock().expect("event sink poisoned"))
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}
