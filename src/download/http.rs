//! HTTP implementation of [`TrackClient`] for SoundCloud-style v2 APIs
//!
//! Metadata comes from `GET {base}/resolve?url=<locator>`. The payload is
//! found in two hops: the track's progressive transcoding URL answers with a
//! JSON `{ "url": ... }` pointing at the audio, which is then streamed to disk.

use super::client::{ProgressFn, TrackClient};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::types::{TrackMetadata, TransferProgress};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

/// Transcoding protocol that serves a single downloadable file
const PROGRESSIVE_PROTOCOL: &str = "progressive";

/// Track client talking to the remote service over HTTP
pub struct HttpTrackClient {
    http: reqwest::Client,
    api_base_url: Url,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    id: Option<serde_json::Value>,
    kind: Option<String>,
    title: Option<String>,
    #[serde(default)]
    media: Option<Media>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    transcodings: Vec<Transcoding>,
}

#[derive(Debug, Deserialize)]
struct Transcoding {
    url: String,
    format: TranscodingFormat,
}

#[derive(Debug, Deserialize)]
struct TranscodingFormat {
    protocol: String,
}

#[derive(Debug, Deserialize)]
struct StreamLocation {
    url: String,
}

impl HttpTrackClient {
    /// Build a client from the remote settings
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let api_base_url = Url::parse(&config.api_base_url).map_err(|e| Error::Config {
            message: format!("'{}' is not a valid URL: {}", config.api_base_url, e),
            key: Some("remote.api_base_url".to_string()),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(network_error)?;

        Ok(Self {
            http,
            api_base_url,
            client_id: config.client_id.clone(),
        })
    }

    fn resolve_url(&self, locator: &str) -> Url {
        let mut url = self.api_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("resolve");
        }
        url.query_pairs_mut().append_pair("url", locator);
        self.with_client_id(url)
    }

    fn with_client_id(&self, mut url: Url) -> Url {
        if let Some(client_id) = &self.client_id {
            url.query_pairs_mut().append_pair("client_id", client_id);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus {
                url: redact_client_id(&url),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TrackClient for HttpTrackClient {
    async fn fetch_metadata(&self, locator: &str) -> Result<TrackMetadata> {
        let url = self.resolve_url(locator);
        debug!(%locator, "resolving track");

        let response = match self.get(url).await {
            Err(Error::RemoteStatus { status: 404, .. }) => {
                return Err(Error::TrackNotFound(locator.to_string()));
            }
            other => other?,
        };

        let body = response.text().await.map_err(network_error)?;
        let resolved: ResolveResponse = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidMetadata(format!("undecodable response: {}", e)))?;

        if let Some(kind) = resolved.kind.as_deref()
            && kind != "track"
        {
            return Err(Error::InvalidMetadata(format!(
                "locator resolves to a {}, not a track",
                kind
            )));
        }

        let title = resolved
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::InvalidMetadata("track has no title".to_string()))?;

        let remote_id = match resolved.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(Error::InvalidMetadata("track has no id".to_string())),
        };

        let media_url = resolved.media.and_then(|media| {
            media
                .transcodings
                .into_iter()
                .find(|t| t.format.protocol == PROGRESSIVE_PROTOCOL)
                .map(|t| t.url)
        });

        Ok(TrackMetadata {
            title,
            remote_id,
            locator: locator.to_string(),
            media_url,
        })
    }

    async fn transfer(
        &self,
        track: &TrackMetadata,
        destination: &Path,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<u64> {
        let media_url = track
            .media_url
            .as_deref()
            .ok_or_else(|| Error::NoStream(track.title.clone()))?;
        let media_url = Url::parse(media_url)
            .map_err(|e| Error::InvalidMetadata(format!("bad media URL: {}", e)))?;

        let location: StreamLocation = {
            let body = self
                .get(self.with_client_id(media_url))
                .await?
                .text()
                .await
                .map_err(network_error)?;
            serde_json::from_str(&body)
                .map_err(|e| Error::InvalidMetadata(format!("undecodable stream location: {}", e)))?
        };
        let stream_url = Url::parse(&location.url)
            .map_err(|e| Error::InvalidMetadata(format!("bad stream URL: {}", e)))?;

        let response = self.get(stream_url).await?;
        let total_bytes = response.content_length();

        let mut file = tokio::fs::File::create(destination).await?;
        let mut bytes_written: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
            on_progress(TransferProgress {
                bytes_written,
                total_bytes,
            });
        }
        file.flush().await?;

        debug!(title = %track.title, bytes_written, ?destination, "payload written");
        Ok(bytes_written)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Wrap a transport error, stripping the client id from the URL reqwest
/// embeds in its message
fn network_error(mut error: reqwest::Error) -> Error {
    if let Some(url) = error.url_mut() {
        strip_client_id(url);
    }
    Error::Network(error)
}

/// Strip the client id from a URL before it lands in an error message
fn redact_client_id(url: &Url) -> String {
    let mut redacted = url.clone();
    strip_client_id(&mut redacted);
    redacted.to_string()
}

fn strip_client_id(url: &mut Url) {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "client_id")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}
