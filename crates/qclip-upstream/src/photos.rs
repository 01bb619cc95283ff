//! Photo search HTTP client.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{UpstreamError, UpstreamResult};
use crate::types::{Photo, SearchResponse};

/// Default photo service endpoint.
pub const DEFAULT_PHOTO_BASE_URL: &str = "https://api.pexels.com";
/// Default search keywords.
pub const DEFAULT_PHOTO_QUERY: &str = "nature landscape";
/// Highest result page picked at random.
pub const MAX_SEARCH_PAGE: u32 = 100;

/// Configuration for the photo client.
#[derive(Clone)]
pub struct PhotoClientConfig {
    /// Base URL of the photo service
    pub base_url: String,
    /// API key sent in the `Authorization` header
    pub api_key: String,
    /// Search keywords
    pub query: String,
    /// Candidates requested per page
    pub per_page: u32,
    /// Bound on the search request
    pub search_timeout: Duration,
    /// Bound on the image download
    pub download_timeout: Duration,
}

impl std::fmt::Debug for PhotoClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .field("per_page", &self.per_page)
            .field("search_timeout", &self.search_timeout)
            .field("download_timeout", &self.download_timeout)
            .finish()
    }
}

impl PhotoClientConfig {
    /// Config with default endpoint and timeouts for the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_PHOTO_BASE_URL.to_string(),
            api_key: api_key.into(),
            query: DEFAULT_PHOTO_QUERY.to_string(),
            per_page: 1,
            search_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> UpstreamResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    ///
    /// `PEXELS_API_KEY` is required; there is no built-in credential.
    pub fn from_lookup<F>(lookup: F) -> UpstreamResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("PEXELS_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| UpstreamError::MissingConfig("PEXELS_API_KEY is not set".to_string()))?;

        let defaults = Self::new(api_key);
        Ok(Self {
            base_url: lookup("PEXELS_BASE_URL").unwrap_or(defaults.base_url),
            query: lookup("PHOTO_QUERY").unwrap_or(defaults.query),
            search_timeout: lookup("PHOTO_SEARCH_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.search_timeout),
            download_timeout: lookup("PHOTO_DOWNLOAD_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.download_timeout),
            ..defaults
        })
    }
}

/// Client for the photo search service.
#[derive(Debug, Clone)]
pub struct PhotoClient {
    http: Client,
    config: PhotoClientConfig,
}

impl PhotoClient {
    /// Create a new photo client.
    pub fn new(config: PhotoClientConfig) -> UpstreamResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(UpstreamError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PhotoClientConfig {
        &self.config
    }

    /// Pick a result page at random so repeated requests vary.
    pub fn search_page() -> u32 {
        rand::rng().random_range(1..=MAX_SEARCH_PAGE)
    }

    /// Search one page and return its first candidate.
    pub async fn search(&self, page: u32) -> UpstreamResult<Photo> {
        let url = format!("{}/v1/search", self.config.base_url.trim_end_matches('/'));
        let timeout = self.config.search_timeout;

        debug!(query = %self.config.query, page, "Searching photos");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, &self.config.api_key)
            .query(&[
                ("query", self.config.query.clone()),
                ("per_page", self.config.per_page.to_string()),
                ("page", page.to_string()),
            ])
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Photo search returned non-success status");
            return Err(UpstreamError::request_failed(format!(
                "Failed to fetch background image (status {})",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;
        let search: SearchResponse = serde_json::from_slice(&body)?;

        search.photos.into_iter().next().ok_or(UpstreamError::NoResults)
    }

    /// Download the background variant of `photo` into `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn download(&self, photo: &Photo, dest: &Path) -> UpstreamResult<u64> {
        let url = photo.background_url().ok_or_else(|| {
            UpstreamError::invalid_response(format!("Photo {} has no downloadable variant", photo.id))
        })?;
        let timeout = self.config.download_timeout;

        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

        if !response.status().is_success() {
            return Err(UpstreamError::request_failed(format!(
                "Background download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;
        tokio::fs::write(dest, &bytes).await?;

        Ok(bytes.len() as u64)
    }

    /// Search a random page and download its first candidate into `dest`.
    pub async fn fetch_background(&self, dest: &Path) -> UpstreamResult<Photo> {
        let page = Self::search_page();
        let photo = self.search(page).await?;
        let size = self.download(&photo, dest).await?;

        info!(photo_id = photo.id, page, bytes = size, "Downloaded background photo");
        Ok(photo)
    }
}
