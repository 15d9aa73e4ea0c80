//! Out-of-band status pages
//!
//! Shoutcast and Icecast servers publish the current title on a page that
//! lives next to the stream mount. Each reader derives that page's URL from
//! the stream URL, fetches it, and pulls the title out of the body.

pub mod icecast;
pub mod shoutcast;

use crate::config::status::{ICECAST_SUFFIX, SHOUTCAST_V1_SUFFIX, SHOUTCAST_V2_SUFFIX};
use crate::error::{MetadataError, Result};
use crate::network::HttpFetcher;

/// Which status page to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPage {
    /// `7.html`, comma-separated fields wrapped in HTML
    ShoutcastV1,
    /// `stats`, XML
    ShoutcastV2,
    /// `status-json.xsl`, JSON
    Icecast,
}

impl StatusPage {
    pub fn suffix(self) -> &'static str {
        match self {
            StatusPage::ShoutcastV1 => SHOUTCAST_V1_SUFFIX,
            StatusPage::ShoutcastV2 => SHOUTCAST_V2_SUFFIX,
            StatusPage::Icecast => ICECAST_SUFFIX,
        }
    }

    /// Status page URL for a stream URL
    pub fn url_for(self, stream_url: &str) -> String {
        companion_url(stream_url, self.suffix())
    }

    /// Extract the title from a page body
    pub fn parse(self, content: &str) -> Result<Option<String>> {
        match self {
            StatusPage::ShoutcastV1 => Ok(shoutcast::parse_v1(content)),
            StatusPage::ShoutcastV2 => shoutcast::parse_v2(content),
            StatusPage::Icecast => icecast::parse(content),
        }
    }

    /// Fetch the page at `meta_url` and parse it.
    ///
    /// Anything but a 200 is reported as `MetadataError::HttpStatus`.
    pub fn read(self, fetcher: &dyn HttpFetcher, meta_url: &str) -> Result<Option<String>> {
        let resp = fetcher.fetch(meta_url)?;
        if resp.status_code != 200 {
            return Err(MetadataError::HttpStatus {
                status_code: resp.status_code,
                message: resp.message,
            });
        }
        self.parse(&resp.content)
    }
}

/// Cut the stream URL at its last `/` and append `/suffix`.
///
/// A URL with no path (`http://host:8000`) gets the suffix appended.
pub fn companion_url(stream_url: &str, suffix: &str) -> String {
    let path_start = stream_url.find("://").map(|p| p + 3).unwrap_or(0);
    let base = match stream_url.rfind('/') {
        Some(pos) if pos >= path_start => &stream_url[..pos],
        _ => stream_url,
    };
    format!("{base}/{suffix}")
}
