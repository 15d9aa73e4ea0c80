//! Error types for Radiotitle
//!
//! Centralized error handling using thiserror. These never reach callers of
//! the public read operations, which degrade every failure to "no title".

use std::io;

use thiserror::Error;

/// Main error type for metadata extraction
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not connect to {address}:{port}: {source}")]
    Connect {
        address: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("HTTP {status_code} {message}")]
    HttpStatus { status_code: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Metadata interval out of range: {0}")]
    IntervalOutOfRange(i64),

    #[error("Redirect limit reached at {0}")]
    RedirectExhausted(String),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("I/O error: {0}")]
    Io(io::Error),
}

/// Result type alias for Radiotitle
pub type Result<T> = std::result::Result<T, MetadataError>;

impl From<io::Error> for MetadataError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Socket read timeouts surface as WouldBlock on Unix
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                MetadataError::Timeout(e.to_string())
            }
            _ => MetadataError::Io(e),
        }
    }
}

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    format!("Network error: {e}")
}
