//! Test configuration helpers for building hosts against mock and live services

use super::fixtures::TempHomePlatform;
use std::sync::Arc;
use tempfile::TempDir;
use track_dl::{Config, HttpTrackClient, PlatformProvider, ScriptHost, TrackDownloader};
use wiremock::MockServer;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Config pointing the HTTP client at a mock server
pub fn mock_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.remote.api_base_url = server.uri();
    config.remote.client_id = Some("test-client-id".to_string());
    config
}

/// Build a host whose downloader uses a real HTTP client and the given platform
pub fn create_host(
    config: Config,
    platform: Arc<dyn PlatformProvider>,
) -> Result<ScriptHost, ConfigError> {
    let client = HttpTrackClient::new(&config.remote)
        .map_err(|e| ConfigError(format!("Failed to create HTTP client: {}", e)))?;
    let downloader = TrackDownloader::new(Arc::new(config), platform, Arc::new(client));
    Ok(ScriptHost::with_downloader(downloader))
}

/// Build a host against a mock server with a temporary POSIX home
///
/// Returns the host and temp home (keep it alive for the test duration)
pub fn create_mock_host(server: &MockServer) -> Result<(ScriptHost, TempDir), ConfigError> {
    let home = tempfile::tempdir()
        .map_err(|e| ConfigError(format!("Failed to create temp dir: {}", e)))?;
    let host = create_host(
        mock_config(server),
        Arc::new(TempHomePlatform::posix(home.path())),
    )?;
    Ok((host, home))
}

/// Load the remote client id from the environment
///
/// Required environment variables:
/// - `TRACK_DL_CLIENT_ID` - API client id for the live service
///
/// Optional environment variables:
/// - `TRACK_DL_API_BASE_URL` - API base URL (default: the built-in default)
pub fn load_live_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let client_id = std::env::var("TRACK_DL_CLIENT_ID")
        .map_err(|_| ConfigError("TRACK_DL_CLIENT_ID not set in environment".to_string()))?;

    let mut config = Config::default();
    config.remote.client_id = Some(client_id);
    if let Ok(base) = std::env::var("TRACK_DL_API_BASE_URL") {
        config.remote.api_base_url = base;
    }
    Ok(config)
}

/// Check if live credentials are available
pub fn has_live_credentials() -> bool {
    load_live_config().is_ok()
}

/// Build a host against the live service with a temporary home
pub fn create_live_host() -> Result<(ScriptHost, TempDir), ConfigError> {
    let config = load_live_config()?;
    let home = tempfile::tempdir()
        .map_err(|e| ConfigError(format!("Failed to create temp dir: {}", e)))?;
    let platform: Arc<dyn PlatformProvider> = if cfg!(windows) {
        Arc::new(TempHomePlatform::windows(home.path()))
    } else {
        Arc::new(TempHomePlatform::posix(home.path()))
    };
    let host = create_host(config, platform)?;
    Ok((host, home))
}

/// Skip test if live credentials are not available
#[macro_export]
macro_rules! skip_if_no_credentials {
    () => {
        if !$crate::common::has_live_credentials() {
            eprintln!("Skipping test: TRACK_DL_CLIENT_ID not found in .env");
            return;
        }
    };
}
