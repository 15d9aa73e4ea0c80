//! Configuration constants for metadata extraction

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests and the ICY handshake
    pub const USER_AGENT: &str = concat!("Radiotitle/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 10;
}

/// ICY in-band metadata configuration
pub mod icy {
    /// Size of the initial read that carries the response head
    pub const HEAD_CHUNK_SIZE: usize = 1024;

    /// Largest accepted `icy-metaint` value (bytes)
    pub const MAX_METAINT: i64 = 64 * 1024;

    /// Metadata block length is the length byte times this
    pub const BLOCK_UNIT: usize = 16;

    /// Default number of metadata frames inspected per call
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default number of 302 redirects followed per call
    pub const DEFAULT_MAX_REDIRECTS: u32 = 2;
}

/// Status page locations relative to the stream's directory
pub mod status {
    pub const SHOUTCAST_V1_SUFFIX: &str = "7.html";
    pub const SHOUTCAST_V2_SUFFIX: &str = "stats";
    pub const ICECAST_SUFFIX: &str = "status-json.xsl";
}

/// Title normalization
pub mod title {
    /// Maximum title length in characters
    pub const MAX_CHARS: usize = 256;
}
