//! Stream URL decomposition
//!
//! Splits a stream URL into the pieces the raw-socket ICY exchange needs:
//! where to connect, whether to wrap the connection in TLS, and what to put
//! in the request line and `Host` header.

use std::fmt;

use url::{Host, Url};

use crate::error::{MetadataError, Result};

/// Where the transport connects, and whether it negotiates TLS first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketAddress {
    Plain(String),
    Tls(String),
}

impl SocketAddress {
    /// Host name or IP literal to resolve (IPv6 without brackets)
    pub fn host(&self) -> &str {
        match self {
            SocketAddress::Plain(h) | SocketAddress::Tls(h) => h,
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, SocketAddress::Tls(_))
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketAddress::Plain(h) => write!(f, "{h}"),
            SocketAddress::Tls(h) => write!(f, "ssl://{h}"),
        }
    }
}

/// A stream URL broken down for a raw-socket request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEndpoint {
    pub scheme: String,
    /// Host as written in the URL (IPv6 keeps its brackets), used for `Host:`
    pub hostname: String,
    pub port: u16,
    /// Path plus `?query` when the URL has one
    pub pathname: String,
    pub socket_address: SocketAddress,
}

impl StreamEndpoint {
    /// Decompose a stream URL.
    ///
    /// Port falls back to 443 for `https` and 80 for everything else.
    pub fn parse(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| MetadataError::InvalidUrl(format!("{url}: {e}")))?;

        let scheme = parsed.scheme().to_ascii_lowercase();
        let hostname = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| MetadataError::InvalidUrl(format!("{url}: missing host")))?
            .to_string();

        // Url::port() hides ports equal to the scheme default, which resolves the same way
        let port = match parsed.port() {
            Some(p) => p,
            None if scheme == "https" => 443,
            None => 80,
        };

        let mut pathname = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            pathname.push('?');
            pathname.push_str(query);
        }

        let connect_host = match parsed.host() {
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => hostname.clone(),
        };
        let socket_address = if scheme == "https" {
            SocketAddress::Tls(connect_host)
        } else {
            SocketAddress::Plain(connect_host)
        };

        Ok(Self {
            scheme,
            hostname,
            port,
            pathname,
            socket_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- port resolution ---

    #[test]
    fn http_defaults_to_port_80() {
        let ep = StreamEndpoint::parse("http://radio.example/live").unwrap();
        assert_eq!(ep.port, 80);
        assert_eq!(ep.scheme, "http");
    }

    #[test]
    fn https_defaults_to_port_443() {
        let ep = StreamEndpoint::parse("https://radio.example/live").unwrap();
        assert_eq!(ep.port, 443);
    }

    #[test]
    fn explicit_port_wins() {
        let ep = StreamEndpoint::parse("https://radio.example:8443/live").unwrap();
        assert_eq!(ep.port, 8443);
        let ep = StreamEndpoint::parse("http://radio.example:8000/;").unwrap();
        assert_eq!(ep.port, 8000);
    }

    #[test]
    fn explicit_default_port_still_resolves() {
        let ep = StreamEndpoint::parse("http://radio.example:80/live").unwrap();
        assert_eq!(ep.port, 80);
        let ep = StreamEndpoint::parse("http://radio.example:443/live").unwrap();
        assert_eq!(ep.port, 443);
    }

    // --- path resolution ---

    #[test]
    fn query_is_appended_to_path() {
        let ep = StreamEndpoint::parse("http://radio.example/stream.mp3?type=http&nocache=1")
            .unwrap();
        assert_eq!(ep.pathname, "/stream.mp3?type=http&nocache=1");
    }

    #[test]
    fn path_without_query() {
        let ep = StreamEndpoint::parse("http://radio.example/a/b/c").unwrap();
        assert_eq!(ep.pathname, "/a/b/c");
    }

    #[test]
    fn bare_host_gets_root_path() {
        let ep = StreamEndpoint::parse("http://radio.example").unwrap();
        assert_eq!(ep.pathname, "/");
    }

    // --- socket address ---

    #[test]
    fn https_socket_address_is_tls_marked() {
        let ep = StreamEndpoint::parse("https://secure.example/live").unwrap();
        assert!(ep.socket_address.is_tls());
        assert_eq!(ep.socket_address.to_string(), "ssl://secure.example");
        assert_eq!(ep.socket_address.host(), "secure.example");
    }

    #[test]
    fn http_socket_address_is_bare_host() {
        let ep = StreamEndpoint::parse("http://plain.example/live").unwrap();
        assert!(!ep.socket_address.is_tls());
        assert_eq!(ep.socket_address.to_string(), "plain.example");
    }

    #[test]
    fn ipv6_host_keeps_brackets_only_in_hostname() {
        let ep = StreamEndpoint::parse("http://[::1]:8000/live").unwrap();
        assert_eq!(ep.hostname, "[::1]");
        assert_eq!(ep.socket_address.host(), "::1");
        assert_eq!(ep.port, 8000);
    }

    #[test]
    fn socket_address_is_never_empty() {
        for url in [
            "http://a.example/",
            "https://b.example:9000/x?y",
            "http://127.0.0.1/stream",
        ] {
            let ep = StreamEndpoint::parse(url).unwrap();
            assert!(!ep.socket_address.host().is_empty(), "{url}");
            assert!(ep.port > 0, "{url}");
        }
    }

    // --- invalid input ---

    #[test]
    fn missing_scheme_is_invalid() {
        let err = StreamEndpoint::parse("radio.example/live").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidUrl(_)));
    }

    #[test]
    fn missing_host_is_invalid() {
        let err = StreamEndpoint::parse("file:///tmp/stream").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidUrl(_)));
    }

    #[test]
    fn empty_string_is_invalid() {
        assert!(StreamEndpoint::parse("").is_err());
    }
}
