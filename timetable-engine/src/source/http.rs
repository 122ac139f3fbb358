//! HTTP timetable source.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use tracing::debug;

use crate::domain::{Dataset, Manifest};

use super::TimetableSource;
use super::error::SourceError;
use super::{parse_dataset, parse_manifest};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Base URL that document paths are resolved against
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Ask every cache on the way for a fresh copy
    pub no_cache: bool,
}

impl HttpSourceConfig {
    /// Create a new config with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            no_cache: true,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Enable or disable cache-bypassing request headers.
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }
}

/// Fetches timetable documents over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: Url,
    no_cache: bool,
}

impl HttpSource {
    /// Create a new HTTP source.
    pub fn new(config: HttpSourceConfig) -> Result<Self, SourceError> {
        let mut base = config.base_url.clone();
        // A base without a trailing slash would have its last segment
        // replaced on join.
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| SourceError::InvalidPath {
            path: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            no_cache: config.no_cache,
        })
    }

    /// Resolve a document path against the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path.trim())
            .map_err(|e| SourceError::InvalidPath {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Build the GET request for a document.
    pub fn request(&self, path: &str) -> Result<reqwest::Request, SourceError> {
        let mut builder = self.http.get(self.url_for(path)?);
        if self.no_cache {
            builder = builder
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        Ok(builder.build()?)
    }

    /// Fetch the raw body of a document.
    async fn get_text(&self, path: &str) -> Result<String, SourceError> {
        let request = self.request(path)?;
        debug!(url = %request.url(), "fetching timetable document");

        let response = self.http.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

impl TimetableSource for HttpSource {
    async fn fetch_dataset(&self, path: &str) -> Result<Dataset, SourceError> {
        let body = self.get_text(path).await?;
        parse_dataset(path, &body)
    }

    async fn fetch_manifest(&self, path: &str) -> Result<Manifest, SourceError> {
        let body = self.get_text(path).await?;
        parse_manifest(path, &body)
    }
}
