//! HTTP transport for resource fetches.
//!
//! The agent never talks to the network directly; it goes through the
//! [`Transport`] seam so the interception strategies can be exercised
//! against fakes. [`HttpTransport`] is the production implementation:
//!
//! - Resolves site-relative resource URLs against the agent's scope
//! - Applies timeout, redirect, and body-size limits
//! - Reports non-success statuses as network errors so callers fall
//!   back to cache instead of caching error pages

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

pub use url::{UrlError, resolve};

use pinshelf_core::{CachedResponse, Error};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Scope the agent serves; relative URLs resolve against it.
    pub base_url: Url,

    /// User agent string (default: "pinshelf/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:8080/").expect("static URL"),
            user_agent: "pinshelf/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The resolved URL that was requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Snapshot this response for storage.
    ///
    /// The snapshot holds its own copy of the body; storing it leaves
    /// this response independently readable by the original caller.
    pub fn to_cached(&self) -> CachedResponse {
        CachedResponse {
            url: self.final_url.to_string(),
            status: self.status.as_u16(),
            content_type: self.content_type.clone(),
            body: self.bytes.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Async seam over the network.
///
/// A fetch either yields a complete, successful response or an error;
/// there is no streaming hand-off, so every caller can snapshot the
/// body for the cache without consuming anything.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a resource URL, resolving it against the agent's scope.
    async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error>;
}

/// HTTP transport backed by reqwest.
pub struct HttpTransport {
    http: Client,
    config: FetchConfig,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url_str: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = resolve(&self.config.base_url, url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {}", url, e)))?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Network(format!("{}: status {}", url, status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::Network(format!(
                "{}: {} bytes exceeds {}",
                url, len, self.config.max_bytes
            )));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("{}: failed to read response: {}", url, e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::Network(format!(
                "{}: {} bytes exceeds {}",
                url,
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }
}
