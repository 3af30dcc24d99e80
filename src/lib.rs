//! # track-dl
//!
//! Scriptable track download commands with classified diagnostic streams.
//!
//! ## Design Philosophy
//!
//! track-dl is designed to be:
//! - **Scriptable** - Commands run from short scripts, chained with `|`
//! - **Quiet** - Commands never print; every message lands in a [`DiagnosticSink`]
//! - **Classified** - Failures become one [`ErrorInfo`] with a category, never a panic
//! - **Injectable** - Platform and remote service sit behind traits for testing
//!
//! ## Quick Start
//!
//! ```no_run
//! use track_dl::{Config, ScriptHost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.remote.client_id = Some("your-client-id".to_string());
//!
//!     let host = ScriptHost::from_config(config)?;
//!     let saved = host
//!         .invoke(r#"Save-Track -TrackUrl "https://soundcloud.com/kevin-kiner/ahsoka-end-credits-from-ahsoka""#)
//!         .await?;
//!
//!     for path in saved {
//!         println!("Saved {}", path);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Commands and their lifecycle
pub mod command;
/// Configuration types
pub mod config;
/// Track download pipeline
pub mod download;
/// Error types
pub mod error;
/// Script parsing and execution
pub mod host;
/// Diagnostic record collection
pub mod sink;
/// Core types and records
pub mod types;

// Re-export commonly used types
pub use command::{
    Command, CommandInput, CommandInvocation, CommandRegistry, CommandSpec, GET_TRACK,
    GetTrackCommand, ParameterSpec, SAVE_TRACK, SaveTrackCommand, run_lifecycle,
};
pub use config::{Config, DownloadConfig, RemoteConfig};
pub use download::{
    HttpTrackClient, Platform, PlatformProvider, ProgressFn, SystemPlatform, TrackClient,
    TrackDownloader, sanitize_file_name,
};
pub use error::{Error, ErrorCategory, ErrorInfo, Result};
pub use host::ScriptHost;
pub use sink::DiagnosticSink;
pub use types::{
    DiagnosticRecord, DownloadResult, ProgressRecord, RecordKind, Stage, TrackInfo,
    TrackMetadata, TransferProgress,
};
