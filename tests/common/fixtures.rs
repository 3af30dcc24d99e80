//! Fake platforms and mock remote service responses

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use track_dl::{Platform, PlatformProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Locator used in the reference acceptance run
pub const AHSOKA_URL: &str = "https://soundcloud.com/kevin-kiner/ahsoka-end-credits-from-ahsoka";

/// Title the mock service reports for [`AHSOKA_URL`]
pub const AHSOKA_TITLE: &str = "Ahsoka: End Credits (From \"Ahsoka\")";

/// Payload the mock service streams for every track
pub const FAKE_MP3: &[u8] = b"ID3\x04\x00\x00fake mp3 frames";

/// Platform with a fixed OS family and home directory
pub struct TempHomePlatform {
    platform: Platform,
    home: Option<PathBuf>,
}

impl TempHomePlatform {
    /// POSIX platform whose `HOME` is `home`
    pub fn posix(home: &Path) -> Self {
        Self {
            platform: Platform::Posix,
            home: Some(home.to_path_buf()),
        }
    }

    /// Windows platform whose `USERPROFILE` is `home`
    pub fn windows(home: &Path) -> Self {
        Self {
            platform: Platform::Windows,
            home: Some(home.to_path_buf()),
        }
    }

    /// Platform the downloader does not support
    pub fn unsupported(os: &str, home: &Path) -> Self {
        Self {
            platform: Platform::Unsupported(os.to_string()),
            home: Some(home.to_path_buf()),
        }
    }
}

impl PlatformProvider for TempHomePlatform {
    fn platform(&self) -> Platform {
        self.platform.clone()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        match (&self.home, self.platform.home_variable()) {
            (Some(home), Some(var)) if var == name => Some(home.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

/// Body of a successful `/resolve` response
pub fn resolve_body(server: &MockServer, title: &str, id: u64) -> Value {
    json!({
        "id": id,
        "kind": "track",
        "title": title,
        "media": {
            "transcodings": [
                {
                    "url": format!("{}/media/{}/stream/hls", server.uri(), id),
                    "format": { "protocol": "hls" }
                },
                {
                    "url": format!("{}/media/{}/stream/progressive", server.uri(), id),
                    "format": { "protocol": "progressive" }
                }
            ]
        }
    })
}

/// Mount the full resolve, stream location and payload chain for one track
pub async fn mount_track(server: &MockServer, locator: &str, title: &str, id: u64) {
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .and(query_param("url", locator))
        .respond_with(ResponseTemplate::new(200).set_body_json(resolve_body(server, title, id)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/media/{}/stream/progressive", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": format!("{}/audio/{}.mp3", server.uri(), id) })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/audio/{}.mp3", id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(FAKE_MP3))
        .mount(server)
        .await;
}

/// Mount a `/resolve` that answers 404 for `locator`
pub async fn mount_missing_track(server: &MockServer, locator: &str) {
    Mock::given(method("GET"))
        .and(path("/resolve"))
        .and(query_param("url", locator))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}
