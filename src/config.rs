//! Configuration types for track-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how downloaded tracks are stored
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Subdirectory of the user's home that receives tracks (default: "Tracks")
    #[serde(default = "default_tracks_subdir")]
    pub tracks_subdir: String,

    /// File extension given to downloaded payloads (default: "mp3")
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            tracks_subdir: default_tracks_subdir(),
            file_extension: default_file_extension(),
        }
    }
}

/// Remote track service settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the track API (default: "https://api-v2.soundcloud.com")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API client id appended to every request, if the service needs one
    #[serde(default)]
    pub client_id: Option<String>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout applied to each HTTP request (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            client_id: None,
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Main configuration for track-dl
///
/// - [`download`](DownloadConfig): destination layout
/// - [`remote`](RemoteConfig): track service endpoint and HTTP settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Destination layout
    #[serde(default)]
    pub download: DownloadConfig,

    /// Remote track service
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Config {
    /// Parse and validate a JSON configuration document
    ///
    /// Missing fields take their defaults, so `{}` is a valid document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce valid destination paths and URLs
    pub fn validate(&self) -> Result<()> {
        validate_path_component("download.tracks_subdir", &self.download.tracks_subdir)?;
        validate_path_component("download.file_extension", &self.download.file_extension)?;

        if url::Url::parse(&self.remote.api_base_url).is_err() {
            return Err(Error::Config {
                message: format!("'{}' is not a valid URL", self.remote.api_base_url),
                key: Some("remote.api_base_url".to_string()),
            });
        }

        Ok(())
    }
}

fn validate_path_component(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config {
            message: "must not be empty".to_string(),
            key: Some(key.to_string()),
        });
    }
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(Error::Config {
            message: format!("'{}' must be a single path component", value),
            key: Some(key.to_string()),
        });
    }
    Ok(())
}

fn default_tracks_subdir() -> String {
    "Tracks".to_string()
}

fn default_file_extension() -> String {
    "mp3".to_string()
}

fn default_api_base_url() -> String {
    "https://api-v2.soundcloud.com".to_string()
}

fn default_user_agent() -> String {
    concat!("track-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
