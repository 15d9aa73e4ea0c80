//! Radiotitle: now-playing titles for internet radio
//!
//! Reads the current title of a live stream through one of four mechanisms:
//! the Shoutcast v1 `7.html` page, the Shoutcast v2 `stats` XML, the Icecast
//! `status-json.xsl` endpoint, or ICY metadata interleaved with the audio.
//!
//! ## Quick start
//!
//! ```no_run
//! use radiotitle::RadioMetadata;
//!
//! let radio = RadioMetadata::new().unwrap();
//! let title = radio.read_icy_metadata("http://example.com/stream", 3, 2);
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod radio;
pub mod status;
pub mod stream;

#[cfg(test)]
mod testing;

pub use error::{MetadataError, Result};
pub use network::{FetchResponse, HttpClient, HttpFetcher};
pub use radio::{MetadataMethod, RadioMetadata};
pub use stream::{Connector, StreamEndpoint, TcpConnector};
