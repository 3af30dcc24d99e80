//! Track download pipeline
//!
//! A download runs four stages strictly in order; the first failing stage
//! ends the run:
//! 1. Resolve - find `<home>/<tracks_subdir>` and create it if missing
//! 2. Metadata - ask the [`TrackClient`] what the locator points at
//! 3. Sanitize - turn the title into a safe file stem
//! 4. Transfer - stream the payload to `<dir>/<stem>.<ext>`, replacing any
//!    existing file
//!
//! Collaborators are injected: a [`PlatformProvider`] answers where home is,
//! a [`TrackClient`] talks to the remote service.

mod client;
mod directory;
mod http;
mod platform;
mod sanitize;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{ProgressFn, TrackClient};
pub use directory::{ensure_directory, home_directory, resolve_destination};
pub use http::HttpTrackClient;
pub use platform::{Platform, PlatformProvider, SystemPlatform};
pub use sanitize::sanitize_file_name;

use crate::config::Config;
use crate::error::{Error, ErrorInfo, Result};
use crate::types::{DownloadResult, Stage, TrackMetadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suffix of the staging file a payload is written to before it is moved
/// into place
const PARTIAL_SUFFIX: &str = "part";

/// Runs the download pipeline against injected collaborators
///
/// Holds no per-run state: every call re-resolves the directory and
/// re-fetches metadata.
#[derive(Clone)]
pub struct TrackDownloader {
    config: Arc<Config>,
    platform: Arc<dyn PlatformProvider>,
    client: Arc<dyn TrackClient>,
}

impl TrackDownloader {
    /// Create a downloader from explicit collaborators
    pub fn new(
        config: Arc<Config>,
        platform: Arc<dyn PlatformProvider>,
        client: Arc<dyn TrackClient>,
    ) -> Self {
        Self {
            config,
            platform,
            client,
        }
    }

    /// Create a downloader for the real system and remote service
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let client = HttpTrackClient::new(&config.remote)?;
        Ok(Self::new(
            Arc::new(config),
            Arc::new(SystemPlatform),
            Arc::new(client),
        ))
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stage 1: resolve and create the destination directory
    pub async fn resolve_directory(&self) -> Result<PathBuf> {
        resolve_destination(self.platform.as_ref(), &self.config.download.tracks_subdir).await
    }

    /// Stage 2: fetch metadata for a locator
    pub async fn fetch_metadata(&self, locator: &str) -> Result<TrackMetadata> {
        let locator = checked_locator(locator)?;
        self.client.fetch_metadata(locator).await
    }

    /// Run all four stages, returning the absolute path written
    ///
    /// `on_progress` is called as payload bytes arrive.
    pub async fn download(
        &self,
        locator: &str,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<PathBuf> {
        let locator = checked_locator(locator)?;

        info!(%locator, client = self.client.name(), "starting track download");

        debug!(stage = %Stage::Resolve, "running stage");
        let dir = self.resolve_directory().await?;

        debug!(stage = %Stage::Metadata, "running stage");
        let track = self.client.fetch_metadata(locator).await?;

        debug!(stage = %Stage::Sanitize, title = %track.title, "running stage");
        let stem = sanitize_file_name(&track.title);
        let destination = dir.join(format!("{}.{}", stem, self.config.download.file_extension));

        debug!(stage = %Stage::Transfer, ?destination, "running stage");
        let bytes = self.transfer(&track, &destination, on_progress).await?;

        info!(
            title = %track.title,
            ?destination,
            bytes,
            "track download complete"
        );
        Ok(destination)
    }

    /// Run the pipeline and classify the outcome
    ///
    /// Never fails: any stage error becomes [`DownloadResult::Failed`] with
    /// the locator attached as the error's source object.
    pub async fn run(&self, locator: &str, on_progress: &mut ProgressFn<'_>) -> DownloadResult {
        match self.download(locator, on_progress).await {
            Ok(path) => DownloadResult::Saved(path),
            Err(e) => {
                warn!(%locator, error = %e, category = %e.category(), "track download failed");
                DownloadResult::Failed(ErrorInfo::from(&e).with_source(locator))
            }
        }
    }

    /// Stage 4: write to a staging file, then move it over the destination
    async fn transfer(
        &self,
        track: &TrackMetadata,
        destination: &Path,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<u64> {
        let partial = partial_path(destination);

        let bytes = match self.client.transfer(track, &partial, on_progress).await {
            Ok(bytes) => bytes,
            Err(e) => {
                discard_partial(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, destination).await {
            discard_partial(&partial).await;
            return Err(Error::Io(e));
        }
        Ok(bytes)
    }
}

fn checked_locator(locator: &str) -> Result<&str> {
    let trimmed = locator.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyLocator);
    }
    Ok(trimmed)
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

async fn discard_partial(partial: &Path) {
    match tokio::fs::remove_file(partial).await {
        Ok(()) => debug!(?partial, "removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(?partial, error = %e, "failed to remove partial download"),
    }
}
