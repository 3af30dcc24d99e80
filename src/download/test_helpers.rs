//! Shared test doubles for the download pipeline.

use super::client::{ProgressFn, TrackClient};
use super::platform::{Platform, PlatformProvider};
use crate::error::{Error, Result};
use crate::types::{TrackMetadata, TransferProgress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Platform with a fixed OS family and environment
pub(crate) struct FakePlatform {
    platform: Platform,
    env: HashMap<String, String>,
}

impl FakePlatform {
    pub(crate) fn posix(home: &Path) -> Self {
        Self::with_var(Platform::Posix, "HOME", home)
    }

    pub(crate) fn windows(home: &Path) -> Self {
        Self::with_var(Platform::Windows, "USERPROFILE", home)
    }

    /// Unsupported OS that nevertheless has HOME set, so a test can check
    /// nothing is created under it
    pub(crate) fn unsupported(os: &str, home: &Path) -> Self {
        Self::with_var(Platform::Unsupported(os.to_string()), "HOME", home)
    }

    pub(crate) fn posix_without_home() -> Self {
        Self {
            platform: Platform::Posix,
            env: HashMap::new(),
        }
    }

    fn with_var(platform: Platform, name: &str, home: &Path) -> Self {
        let mut env = HashMap::new();
        env.insert(name.to_string(), home.to_string_lossy().into_owned());
        Self { platform, env }
    }
}

impl PlatformProvider for FakePlatform {
    fn platform(&self) -> Platform {
        self.platform.clone()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }
}

/// Where the fake client should fail, if anywhere
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FakeFailure {
    None,
    MetadataNotFound,
    TransferRefused,
    /// Writes half the payload, then fails
    TransferInterrupted,
}

/// In-memory track service
pub(crate) struct FakeTrackClient {
    pub(crate) title: String,
    pub(crate) payload: Vec<u8>,
    pub(crate) failure: FakeFailure,
    pub(crate) metadata_calls: AtomicUsize,
    pub(crate) transfer_calls: AtomicUsize,
}

impl FakeTrackClient {
    pub(crate) fn new(title: &str, payload: &[u8]) -> Self {
        Self {
            title: title.to_string(),
            payload: payload.to_vec(),
            failure: FakeFailure::None,
            metadata_calls: AtomicUsize::new(0),
            transfer_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(title: &str, failure: FakeFailure) -> Self {
        Self {
            failure,
            ..Self::new(title, b"payload")
        }
    }
}

#[async_trait]
impl TrackClient for FakeTrackClient {
    async fn fetch_metadata(&self, locator: &str) -> Result<TrackMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.failure == FakeFailure::MetadataNotFound {
            return Err(Error::TrackNotFound(locator.to_string()));
        }
        Ok(TrackMetadata {
            title: self.title.clone(),
            remote_id: "42".to_string(),
            locator: locator.to_string(),
            media_url: Some("fake://media".to_string()),
        })
    }

    async fn transfer(
        &self,
        _track: &TrackMetadata,
        destination: &Path,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<u64> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        let total_bytes = Some(self.payload.len() as u64);
        match self.failure {
            FakeFailure::TransferRefused => Err(Error::RemoteStatus {
                url: "fake://media".to_string(),
                status: 403,
            }),
            FakeFailure::TransferInterrupted => {
                let half = &self.payload[..self.payload.len() / 2];
                tokio::fs::write(destination, half).await?;
                on_progress(TransferProgress {
                    bytes_written: half.len() as u64,
                    total_bytes,
                });
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )))
            }
            FakeFailure::None | FakeFailure::MetadataNotFound => {
                tokio::fs::write(destination, &self.payload).await?;
                on_progress(TransferProgress {
                    bytes_written: self.payload.len() as u64,
                    total_bytes,
                });
                Ok(self.payload.len() as u64)
            }
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
