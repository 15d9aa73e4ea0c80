//! Public entry points
//!
//! `RadioMetadata` reads a station's current title with the method the
//! caller picks. None of the read operations fail: an unreachable server, a
//! bad status code or an unparsable page all come back as `None`, and the
//! reason is only visible in the logs.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::icy::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REDIRECTS};
use crate::config::network::READ_TIMEOUT_SECS;
use crate::error::{MetadataError, Result};
use crate::network::{HttpClient, HttpFetcher};
use crate::status::StatusPage;
use crate::stream::icy::IcyReader;
use crate::stream::transport::{Connector, TcpConnector};

/// How to obtain a station's title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataMethod {
    ShoutcastV1,
    ShoutcastV2,
    Icecast,
    Icy,
}

impl MetadataMethod {
    pub const ALL: [MetadataMethod; 4] = [
        MetadataMethod::ShoutcastV1,
        MetadataMethod::ShoutcastV2,
        MetadataMethod::Icecast,
        MetadataMethod::Icy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataMethod::ShoutcastV1 => "shoutcast-v1",
            MetadataMethod::ShoutcastV2 => "shoutcast-v2",
            MetadataMethod::Icecast => "icecast",
            MetadataMethod::Icy => "icy",
        }
    }
}

impl fmt::Display for MetadataMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| {
                format!("unknown method '{s}' (expected shoutcast-v1, shoutcast-v2, icecast or icy)")
            })
    }
}

/// Reads now-playing titles from internet radio stations
pub struct RadioMetadata {
    fetcher: Box<dyn HttpFetcher>,
    connector: Box<dyn Connector>,
    timeout: Duration,
}

impl RadioMetadata {
    /// Reader using the default HTTP client and TCP/TLS connector
    pub fn new() -> Result<Self> {
        Ok(Self::from_parts(HttpClient::new()?, TcpConnector::new()?))
    }

    pub fn from_parts(
        fetcher: impl HttpFetcher + 'static,
        connector: impl Connector + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            connector: Box::new(connector),
            timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl HttpFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    /// Connect/read timeout of the ICY socket
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn read_shoutcast_v1_metadata(&self, stream_url: &str) -> Option<String> {
        self.read_status_page(StatusPage::ShoutcastV1, stream_url)
    }

    pub fn read_shoutcast_v2_metadata(&self, stream_url: &str) -> Option<String> {
        self.read_status_page(StatusPage::ShoutcastV2, stream_url)
    }

    pub fn read_icecast_metadata(&self, stream_url: &str) -> Option<String> {
        self.read_status_page(StatusPage::Icecast, stream_url)
    }

    /// Read the title from ICY metadata interleaved with the audio.
    ///
    /// Inspects at most `max_attempts` metadata frames and follows at most
    /// `max_redirect` `302 Found` responses.
    pub fn read_icy_metadata(
        &self,
        stream_url: &str,
        max_attempts: u32,
        max_redirect: u32,
    ) -> Option<String> {
        let reader = IcyReader::new(self.connector.as_ref(), self.timeout);
        match reader.read_title(stream_url, max_attempts, max_redirect) {
            Ok(title) => non_empty(title),
            Err(e) => {
                trace!(url = stream_url, error = %e, "ICY metadata unavailable");
                None
            }
        }
    }

    /// Read with the given method, using the default ICY limits
    pub fn read(&self, method: MetadataMethod, stream_url: &str) -> Option<String> {
        match method {
            MetadataMethod::ShoutcastV1 => self.read_shoutcast_v1_metadata(stream_url),
            MetadataMethod::ShoutcastV2 => self.read_shoutcast_v2_metadata(stream_url),
            MetadataMethod::Icecast => self.read_icecast_metadata(stream_url),
            MetadataMethod::Icy => {
                self.read_icy_metadata(stream_url, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REDIRECTS)
            }
        }
    }

    fn read_status_page(&self, page: StatusPage, stream_url: &str) -> Option<String> {
        let meta_url = page.url_for(stream_url);
        match page.read(self.fetcher.as_ref(), &meta_url) {
            Ok(title) => non_empty(title),
            Err(MetadataError::HttpStatus {
                status_code,
                message,
            }) => {
                debug!("Failed to read {meta_url}: {status_code} {message}");
                None
            }
            Err(e) => {
                trace!(url = %meta_url, error = %e, "status page unreadable");
                None
            }
        }
    }
}

fn non_empty(title: Option<String>) -> Option<String> {
    title.filter(|t| !t.is_empty())
}
