//! Stream-side metadata
//!
//! URL decomposition, the raw transport, and the ICY in-band reader.

pub mod endpoint;
pub mod icy;
pub mod metadata;
pub mod scan;
pub mod transport;

pub use endpoint::{SocketAddress, StreamEndpoint};
pub use icy::IcyReader;
pub use metadata::{truncate_title, MetadataBlock};
pub use scan::find_following;
pub use transport::{Connector, IcyStream, TcpConnector};
