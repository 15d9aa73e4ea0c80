//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! USER_AGENT and timeout configuration.

use std::time::Duration;

use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::Result;

/// Body and status of a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub content: String,
    pub status_code: u16,
    /// Reason phrase, e.g. "Not Found"
    pub message: String,
}

/// Fetches a URL and reports the status instead of failing on non-2xx
pub trait HttpFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Shared HTTP client with standard configuration
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a new client with default Radiotitle settings
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(READ_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .timeout(timeout)
            .build()?;
        Ok(Self { inner })
    }

    /// Access the underlying reqwest client
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.inner
    }
}

impl HttpFetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let resp = self.inner.get(url).send()?;
        let status = resp.status();
        // Error pages may have undecodable bodies; the status is what matters then
        let content = if status.is_success() {
            resp.text()?
        } else {
            resp.text().unwrap_or_default()
        };
        Ok(FetchResponse {
            content,
            status_code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("").to_string(),
        })
    }
}
