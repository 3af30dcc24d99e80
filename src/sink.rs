//! Ordered collector for the six diagnostic channels
//!
//! Commands never print. Everything they produce (result objects, errors,
//! warnings, verbose and debug text, progress) is appended to a
//! [`DiagnosticSink`] in the order it happens. Callers read the records back
//! after the run, or subscribe to see them live.

use crate::error::ErrorInfo;
use crate::types::{DiagnosticRecord, ProgressRecord, RecordKind};
use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the live broadcast channel
const BROADCAST_CAPACITY: usize = 1000;

/// Append-only, ordered, multiplexed record log
pub struct DiagnosticSink {
    records: Vec<DiagnosticRecord>,
    /// Output records redirected to the next pipeline stage instead of the log
    captured: Option<Vec<serde_json::Value>>,
    event_tx: broadcast::Sender<DiagnosticRecord>,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSink {
    /// Create an empty sink
    pub fn new() -> Self {
        let (event_tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            records: Vec::new(),
            captured: None,
            event_tx,
        }
    }

    /// Subscribe to records as they are written
    ///
    /// Output records that are captured for a downstream pipeline stage are
    /// not broadcast.
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticRecord> {
        self.event_tx.subscribe()
    }

    /// Write a result object to the output stream
    pub fn write_output(&mut self, value: serde_json::Value) {
        if let Some(captured) = self.captured.as_mut() {
            tracing::trace!(%value, "output captured for next stage");
            captured.push(value);
            return;
        }
        tracing::debug!(%value, "output");
        self.push(DiagnosticRecord::Output(value));
    }

    /// Serialize and write a result object to the output stream
    pub fn write_object<T: Serialize>(&mut self, object: &T) -> crate::Result<()> {
        let value = serde_json::to_value(object)?;
        self.write_output(value);
        Ok(())
    }

    /// Write a failure to the error stream
    pub fn write_error(&mut self, info: ErrorInfo) {
        tracing::warn!(
            category = %info.category,
            error_id = %info.error_id,
            message = %info.message,
            "command error"
        );
        self.push(DiagnosticRecord::Error(info));
    }

    /// Write a warning message
    pub fn write_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "command warning");
        self.push(DiagnosticRecord::Warning(message));
    }

    /// Write a verbose message
    pub fn write_verbose(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "verbose");
        self.push(DiagnosticRecord::Verbose(message));
    }

    /// Write a debug message
    pub fn write_debug(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(%message, "debug");
        self.push(DiagnosticRecord::Debug(message));
    }

    /// Write a progress update
    pub fn write_progress(&mut self, progress: ProgressRecord) {
        tracing::trace!(
            activity = %progress.activity,
            status = %progress.status,
            percent = ?progress.percent_complete,
            "progress"
        );
        self.push(DiagnosticRecord::Progress(progress));
    }

    /// All records in production order
    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    /// Consume the sink, returning its records
    pub fn into_records(self) -> Vec<DiagnosticRecord> {
        self.records
    }

    /// Output payloads in production order
    pub fn outputs(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.records.iter().filter_map(|r| match r {
            DiagnosticRecord::Output(value) => Some(value),
            _ => None,
        })
    }

    /// Error payloads in production order
    pub fn errors(&self) -> impl Iterator<Item = &ErrorInfo> {
        self.records.iter().filter_map(|r| match r {
            DiagnosticRecord::Error(info) => Some(info),
            _ => None,
        })
    }

    /// Records of one kind, in production order
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &DiagnosticRecord> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    /// Number of records written
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Redirect subsequent Output records into a capture buffer
    ///
    /// Used by the script host so an upstream stage's results feed the next
    /// stage instead of the final result set. Any previous capture is
    /// discarded.
    pub(crate) fn begin_capture(&mut self) {
        self.captured = Some(Vec::new());
    }

    /// Stop capturing and return what was captured
    pub(crate) fn end_capture(&mut self) -> Vec<serde_json::Value> {
        self.captured.take().unwrap_or_default()
    }

    fn push(&mut self, record: DiagnosticRecord) {
        // No receivers is the normal case
        self.event_tx.send(record.clone()).ok();
        self.records.push(record);
    }
}
