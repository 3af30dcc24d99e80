//! Remote track service abstraction

use crate::Result;
use crate::types::{TrackMetadata, TransferProgress};
use async_trait::async_trait;
use std::path::Path;

/// Callback invoked as payload bytes are written
pub type ProgressFn<'a> = dyn FnMut(TransferProgress) + Send + 'a;

/// Remote service that knows about tracks and serves their audio
///
/// The download pipeline only talks to the service through this trait, so a
/// test double can stand in for the network.
///
/// # Examples
///
/// ```no_run
/// use track_dl::download::{HttpTrackClient, TrackClient};
/// use track_dl::config::RemoteConfig;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpTrackClient::new(&RemoteConfig::default())?;
/// let track = client
///     .fetch_metadata("https://soundcloud.com/artist/some-track")
///     .await?;
/// let bytes = client
///     .transfer(&track, Path::new("/tmp/some-track.mp3"), &mut |_| {})
///     .await?;
/// println!("{} bytes for {}", bytes, track.title);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TrackClient: Send + Sync {
    /// Look up the track behind a locator
    ///
    /// # Errors
    ///
    /// Returns a network-class error when the service is unreachable, does
    /// not know the locator, or answers with metadata that cannot be used.
    async fn fetch_metadata(&self, locator: &str) -> Result<TrackMetadata>;

    /// Stream the track's payload into `destination`, creating or truncating it
    ///
    /// Returns the number of bytes written.
    async fn transfer(
        &self,
        track: &TrackMetadata,
        destination: &Path,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<u64>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
