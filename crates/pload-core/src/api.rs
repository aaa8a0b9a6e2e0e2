//! Backend collaborators: track validation and catalog search.
//!
//! The editor only depends on the [`TrackValidator`] and [`CatalogSearch`]
//! traits. [`ApiClient`] implements both against the loader backend's
//! `/api/validate_track` and `/api/search` endpoints.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::track::TrackEntry;

/// Resolves a candidate URL into a canonical track entry.
///
/// Implementations must be idempotent and must not touch the playlist.
pub trait TrackValidator: Send + Sync {
    /// Validate `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if the URL is rejected, or a
    /// transport error if the backend cannot be reached.
    fn validate(&self, url: &str) -> impl Future<Output = Result<TrackEntry>> + Send;
}

/// Free-text search over the track catalog.
pub trait CatalogSearch: Send + Sync {
    /// Search for `query`, returning candidates in ranking order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers garbage.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<TrackEntry>>> + Send;
}

/// Track fields as the backend sends them.
#[derive(Debug, Default, Deserialize)]
struct WireTrack {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    title: Option<String>,
    /// Catalog documents name the title `song`.
    #[serde(default)]
    song: Option<String>,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    length: Option<f64>,
    #[serde(default)]
    bitrate: Option<u32>,
    #[serde(default, alias = "sample")]
    sample_rate: Option<u32>,
}

impl WireTrack {
    fn into_entry(self, fallback_url: &str) -> TrackEntry {
        TrackEntry {
            url: self.url.unwrap_or_else(|| fallback_url.to_string()),
            artist: self.artist,
            title: self.title.or(self.song),
            album: self.album,
            label: self.label,
            length: self.length,
            bitrate: self.bitrate,
            sample_rate: self.sample_rate,
            ..Default::default()
        }
    }
}

/// Body of `/api/validate_track`.
#[derive(Debug, Deserialize)]
struct ValidateResponse {
    result: bool,
    #[serde(flatten)]
    track: WireTrack,
}

impl ValidateResponse {
    fn into_entry(self, input: &str) -> Result<TrackEntry> {
        if !self.result {
            return Err(Error::validation(input, "rejected by backend"));
        }
        Ok(self.track.into_entry(input))
    }
}

/// Body of `/api/search`.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: WireTrack,
}

impl SearchResponse {
    fn into_entries(self) -> Vec<TrackEntry> {
        self.hits
            .into_iter()
            .map(|hit| hit.source.into_entry(""))
            .collect()
    }
}

/// HTTP client for the playlist loader backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    /// Create a client from editor configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &EditorConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), name)
    }
}

impl TrackValidator for ApiClient {
    async fn validate(&self, url: &str) -> Result<TrackEntry> {
        debug!("Validating track URL: {}", url);
        let response: ValidateResponse = self
            .http
            .get(self.endpoint("validate_track"))
            .query(&[("url", url)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_entry(url).inspect_err(|e| {
            warn!("{}", e);
        })
    }
}

impl CatalogSearch for ApiClient {
    async fn search(&self, query: &str) -> Result<Vec<TrackEntry>> {
        debug!("Searching catalog: {}", query);
        let response: SearchResponse = self
            .http
            .get(self.endpoint("search"))
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let entries = response.into_entries();
        debug!("Search for {:?} returned {} hits", query, entries.len());
        Ok(entries)
    }
}
