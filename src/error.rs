//! Error types for track-dl
//!
//! This module provides the error handling for the library:
//! - A single [`Error`] enum used by every pipeline stage and the script host
//! - The three-way [`ErrorCategory`] taxonomy reported to callers
//! - [`ErrorInfo`], the structured payload carried by Error diagnostic records

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for track-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for track-dl
///
/// Each variant carries enough context to build a human-readable message and
/// is mapped to an [`ErrorCategory`] by [`Error::category`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tracks_subdir")
        key: Option<String>,
    },

    /// The track locator was empty
    #[error("track locator must not be empty")]
    EmptyLocator,

    /// The current operating system has no known home directory variable
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The platform's home directory variable is missing or empty
    #[error("home directory variable {variable} is not set")]
    HomeNotSet {
        /// Name of the environment variable that was consulted
        variable: String,
    },

    /// The destination directory exists as something else or could not be created
    #[error("destination {path} is unavailable: {reason}")]
    Destination {
        /// The directory that could not be used
        path: PathBuf,
        /// Why the directory could not be used
        reason: String,
    },

    /// Transport-level HTTP failure (connect, timeout, body read)
    ///
    /// No `From` conversion: build it through the HTTP client so credentials
    /// are stripped from the request URL first.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("remote service returned HTTP {status} for {url}")]
    RemoteStatus {
        /// The requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Remote service has no track for the locator
    #[error("track not found: {0}")]
    TrackNotFound(String),

    /// Remote metadata could not be interpreted
    #[error("invalid track metadata: {0}")]
    InvalidMetadata(String),

    /// Track has no downloadable stream
    #[error("no downloadable stream for track '{0}'")]
    NoStream(String),

    /// A local source could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        /// The path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Script text could not be parsed
    #[error("script parse error at line {line}: {message}")]
    ScriptParse {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// No command is registered under the name
    #[error("the term '{0}' is not recognized as a command")]
    CommandNotFound(String),

    /// Arguments could not be bound to the command's parameters
    #[error("cannot bind parameters for {command}: {message}")]
    ParameterBinding {
        /// Command being invoked
        command: String,
        /// Binding problem
        message: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify this error into the caller-facing taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network(_)
            | Error::RemoteStatus { .. }
            | Error::TrackNotFound(_)
            | Error::InvalidMetadata(_)
            | Error::NoStream(_) => ErrorCategory::NetworkFailure,

            Error::Read { .. } => ErrorCategory::ReadFailure,

            Error::Config { .. }
            | Error::EmptyLocator
            | Error::UnsupportedPlatform(_)
            | Error::HomeNotSet { .. }
            | Error::Destination { .. }
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::ScriptParse { .. }
            | Error::CommandNotFound(_)
            | Error::ParameterBinding { .. }
            | Error::Other(_) => ErrorCategory::Unspecified,
        }
    }

    /// Machine-readable identifier for this error
    pub fn error_id(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::EmptyLocator => "empty_locator",
            Error::UnsupportedPlatform(_) => "unsupported_platform",
            Error::HomeNotSet { .. } => "home_not_set",
            Error::Destination { .. } => "destination_unavailable",
            Error::Network(_) => "network_error",
            Error::RemoteStatus { .. } => "remote_status",
            Error::TrackNotFound(_) => "track_not_found",
            Error::InvalidMetadata(_) => "invalid_metadata",
            Error::NoStream(_) => "no_stream",
            Error::Read { .. } => "read_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ScriptParse { .. } => "script_parse_error",
            Error::CommandNotFound(_) => "command_not_found",
            Error::ParameterBinding { .. } => "parameter_binding",
            Error::Other(_) => "internal_error",
        }
    }
}

/// Caller-facing error classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Source file unreadable or malformed
    ReadFailure,
    /// Remote metadata or payload unavailable
    NetworkFailure,
    /// Anything else, including an unsupported platform
    Unspecified,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::ReadFailure => "ReadFailure",
            ErrorCategory::NetworkFailure => "NetworkFailure",
            ErrorCategory::Unspecified => "Unspecified",
        };
        f.write_str(s)
    }
}

/// Structured failure carried by an Error diagnostic record
///
/// Built once per failed operation from an [`Error`]; the optional
/// `source_object` names the input the failure applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Taxonomy bucket
    pub category: ErrorCategory,
    /// Machine-readable error id (e.g. "track_not_found")
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// The object this error applies to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_object: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create an error info with an explicit category
    pub fn new(
        category: ErrorCategory,
        error_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            error_id: error_id.into(),
            message: message.into(),
            source_object: None,
        }
    }

    /// Attach the object this error applies to
    pub fn with_source(mut self, source_object: impl Into<serde_json::Value>) -> Self {
        self.source_object = Some(source_object.into());
        self
    }

    /// Detail line shown to users
    pub fn details(&self) -> String {
        format!("Failed due to: {}", self.message)
    }
}

impl From<&Error> for ErrorInfo {
    fn from(error: &Error) -> Self {
        ErrorInfo::new(error.category(), error.error_id(), error.to_string())
    }
}

impl From<Error> for ErrorInfo {
    fn from(error: Error) -> Self {
        ErrorInfo::from(&error)
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}
