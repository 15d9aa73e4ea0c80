//! ICY metadata blocks and title normalization

use std::io::Read;

use crate::config::icy::BLOCK_UNIT;
use crate::config::title::MAX_CHARS;
use crate::error::Result;
use crate::stream::scan::find_following;

const STREAM_TITLE_KEY: &str = "StreamTitle=";

/// One framed metadata block read from an ICY stream.
///
/// On the wire: a length byte `n`, then `n * 16` bytes of
/// `key='value';` fields, NUL-padded to the block size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    bytes: Vec<u8>,
}

impl MetadataBlock {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read a length byte and the block that follows it.
    ///
    /// Returns `None` for a zero length byte, without touching the reader
    /// further.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Self>> {
        let mut len_byte = [0u8; 1];
        reader.read_exact(&mut len_byte)?;

        let len = len_byte[0] as usize * BLOCK_UNIT;
        if len == 0 {
            return Ok(None);
        }

        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        Ok(Some(Self { bytes }))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Block text with trailing NUL padding removed, decoded lossily
    pub fn text(&self) -> String {
        let end = self
            .bytes
            .iter()
            .rposition(|&b| b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        String::from_utf8_lossy(&self.bytes[..end]).into_owned()
    }

    /// The `StreamTitle` value, quotes stripped and truncated.
    ///
    /// `Some("")` means the station sent an explicitly empty title;
    /// `None` means the field is missing or has no value at all.
    pub fn stream_title(&self) -> Option<String> {
        let text = self.text();
        let fields: Vec<&str> = text.split(';').collect();
        let raw = find_following(fields.iter().copied(), STREAM_TITLE_KEY)?;
        if raw.is_empty() {
            return None;
        }
        Some(clean_title(raw))
    }
}

/// Strip surrounding `'` quotes and cap the length
pub fn clean_title(raw: &str) -> String {
    truncate_title(raw.trim_matches('\''))
}

/// Truncate to at most `MAX_CHARS` characters (not bytes)
pub fn truncate_title(title: &str) -> String {
    match title.char_indices().nth(MAX_CHARS) {
        Some((byte_pos, _)) => title[..byte_pos].to_string(),
        None => title.to_string(),
    }
}
