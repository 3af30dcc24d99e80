//! Core types for track-dl

use crate::error::ErrorInfo;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of diagnostic record, one per sink channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Standard output
    Output,
    /// Error
    Error,
    /// Warning
    Warning,
    /// Verbose
    Verbose,
    /// Debug
    Debug,
    /// Progress
    Progress,
}

/// Progress report for a long-running activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// What is being done (e.g. "Save-Track")
    pub activity: String,
    /// Current status line
    pub status: String,
    /// Completion percentage, when the total size is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u8>,
}

/// One message produced while a command runs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DiagnosticRecord {
    /// A result object written to the output stream
    Output(serde_json::Value),
    /// A failure
    Error(ErrorInfo),
    /// A warning message
    Warning(String),
    /// A verbose message
    Verbose(String),
    /// A debug message
    Debug(String),
    /// A progress update
    Progress(ProgressRecord),
}

impl DiagnosticRecord {
    /// The channel this record belongs to
    pub fn kind(&self) -> RecordKind {
        match self {
            DiagnosticRecord::Output(_) => RecordKind::Output,
            DiagnosticRecord::Error(_) => RecordKind::Error,
            DiagnosticRecord::Warning(_) => RecordKind::Warning,
            DiagnosticRecord::Verbose(_) => RecordKind::Verbose,
            DiagnosticRecord::Debug(_) => RecordKind::Debug,
            DiagnosticRecord::Progress(_) => RecordKind::Progress,
        }
    }
}

/// Download pipeline stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Destination directory resolution
    Resolve,
    /// Remote metadata fetch
    Metadata,
    /// Title to filename conversion
    Sanitize,
    /// Payload transfer to disk
    Transfer,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Resolve => "resolve",
            Stage::Metadata => "metadata",
            Stage::Sanitize => "sanitize",
            Stage::Transfer => "transfer",
        };
        f.write_str(s)
    }
}

/// Metadata of a remote track
///
/// Fetched once per pipeline run and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    /// Human-readable title
    pub title: String,
    /// Identifier assigned by the remote service
    pub remote_id: String,
    /// Locator the metadata was resolved from
    pub locator: String,
    /// Endpoint that yields the payload location, if the service exposed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

/// Object emitted by the Get-Track command
///
/// Field names match Save-Track's parameters so the object binds by
/// property name when piped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrackInfo {
    /// Track title
    pub title: String,
    /// Locator the track was resolved from
    pub track_url: String,
    /// Remote identifier
    pub id: String,
}

impl From<&TrackMetadata> for TrackInfo {
    fn from(track: &TrackMetadata) -> Self {
        Self {
            title: track.title.clone(),
            track_url: track.locator.clone(),
            id: track.remote_id.clone(),
        }
    }
}

/// Bytes moved so far during a transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes written to disk
    pub bytes_written: u64,
    /// Total payload size, when the server announced it
    pub total_bytes: Option<u64>,
}

impl TransferProgress {
    /// Completion percentage, if the total is known
    pub fn percent(&self) -> Option<u8> {
        match self.total_bytes {
            Some(0) => Some(100),
            Some(total) => {
                let pct = self.bytes_written.saturating_mul(100) / total;
                Some(pct.min(100) as u8)
            }
            None => None,
        }
    }
}

/// Outcome of one download pipeline run: a written file or a failure, never both
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadResult {
    /// Absolute path of the written file
    Saved(PathBuf),
    /// Classified failure
    Failed(ErrorInfo),
}

impl DownloadResult {
    /// Whether the run produced a file
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadResult::Saved(_))
    }

    /// The written path, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            DownloadResult::Saved(path) => Some(path),
            DownloadResult::Failed(_) => None,
        }
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            DownloadResult::Saved(_) => None,
            DownloadResult::Failed(info) => Some(info),
        }
    }
}
