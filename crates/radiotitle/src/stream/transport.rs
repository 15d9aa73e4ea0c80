//! Raw socket transport for the ICY exchange
//!
//! The ICY reader needs the bytes exactly as they come off the wire, so it
//! talks to the server over a plain `TcpStream` (wrapped in rustls for
//! `https`) instead of going through an HTTP client.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::error::{MetadataError, Result};
use crate::stream::endpoint::StreamEndpoint;

/// A bidirectional byte stream to a radio server
pub trait IcyStream: Read + Write + Send {}
impl<T: Read + Write + Send> IcyStream for T {}

/// Opens connections to stream endpoints.
///
/// Implementations must apply `timeout` to connecting and to every
/// subsequent read, and must negotiate TLS when the endpoint's socket
/// address is TLS-marked.
///
/// `TcpConnector` resolves the host with the system resolver first. That
/// lookup is not bounded by `timeout`, so a stalled DNS server can block a
/// read for as long as the resolver itself waits.
pub trait Connector: Send + Sync {
    fn connect(&self, endpoint: &StreamEndpoint, timeout: Duration) -> Result<Box<dyn IcyStream>>;
}

/// Default connector: TCP with optional rustls, trusting the webpki roots
#[derive(Clone)]
pub struct TcpConnector {
    tls: Arc<ClientConfig>,
}

impl TcpConnector {
    pub fn new() -> Result<Self> {
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config =
            ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()?
                .with_root_certificates(roots)
                .with_no_client_auth();
        Ok(Self {
            tls: Arc::new(config),
        })
    }

    fn connect_tcp(&self, endpoint: &StreamEndpoint, timeout: Duration) -> Result<TcpStream> {
        let host = endpoint.socket_address.host();
        let port = endpoint.port;
        let connect_err = |source| MetadataError::Connect {
            address: endpoint.socket_address.to_string(),
            port,
            source,
        };

        let mut last_err = None;
        for addr in (host, port).to_socket_addrs().map_err(connect_err)? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(connect_err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
        })))
    }
}

impl Connector for TcpConnector {
    fn connect(&self, endpoint: &StreamEndpoint, timeout: Duration) -> Result<Box<dyn IcyStream>> {
        let tcp = self.connect_tcp(endpoint, timeout)?;

        if !endpoint.socket_address.is_tls() {
            return Ok(Box::new(tcp));
        }

        let server_name = ServerName::try_from(endpoint.socket_address.host().to_string())
            .map_err(|e| MetadataError::InvalidUrl(format!("{}: {e}", endpoint.hostname)))?;
        let conn = ClientConnection::new(self.tls.clone(), server_name)?;
        Ok(Box::new(StreamOwned::new(conn, tcp)))
    }
}
