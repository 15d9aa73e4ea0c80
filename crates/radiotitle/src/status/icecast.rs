//! Icecast `status-json.xsl`

use serde::Deserialize;

use crate::error::{MetadataError, Result};

#[derive(Debug, Deserialize)]
struct IcecastStatus {
    icecasts: Option<IcecastStats>,
}

#[derive(Debug, Deserialize)]
struct IcecastStats {
    source: Option<Sources>,
}

/// A single mount is an object, several mounts an array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Sources {
    One(IcecastSource),
    Many(Vec<IcecastSource>),
}

#[derive(Debug, Deserialize)]
struct IcecastSource {
    title: Option<String>,
    yp_currently_playing: Option<String>,
}

impl IcecastSource {
    fn now_playing(self) -> Option<String> {
        self.title.or(self.yp_currently_playing)
    }
}

/// `icecasts.source.title`, falling back to `yp_currently_playing`.
///
/// With several sources, the first one carrying either key wins.
pub fn parse(content: &str) -> Result<Option<String>> {
    let status: IcecastStatus = serde_json::from_str(content)
        .map_err(|e| MetadataError::Parse(format!("status-json: {e}")))?;

    let Some(source) = status.icecasts.and_then(|stats| stats.source) else {
        return Ok(None);
    };

    Ok(match source {
        Sources::One(source) => source.now_playing(),
        Sources::Many(sources) => sources.into_iter().find_map(IcecastSource::now_playing),
    })
}
