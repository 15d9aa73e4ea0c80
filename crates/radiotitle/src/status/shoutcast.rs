//! Shoutcast status pages
//!
//! v1 serves `7.html`:
//! `<html><body>listeners,status,peak,max,unique,bitrate,title</body></html>`.
//! v2 serves an XML `stats` document with a `SONGTITLE` element.

use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

use crate::error::{MetadataError, Result};

/// Zero-based position of the title in the v1 field list
const V1_TITLE_FIELD: usize = 6;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Remove markup tags, keeping the text between them
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Title from a v1 `7.html` body, `None` with fewer than seven fields.
///
/// Only field 6 is returned; anything after a seventh comma is dropped.
pub fn parse_v1(content: &str) -> Option<String> {
    let text = strip_tags(content);
    text.split(',')
        .nth(V1_TITLE_FIELD)
        .map(|title| title.trim().to_string())
}

/// Text of the `SONGTITLE` child of the root element of a v2 `stats` body
pub fn parse_v2(content: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(content);
    let mut depth = 0usize;
    let mut in_title = false;
    let mut title = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 2 && e.name().as_ref() == b"SONGTITLE" {
                    in_title = true;
                }
            }
            Ok(Event::Empty(e)) if depth == 1 && e.name().as_ref() == b"SONGTITLE" => {
                return Ok(Some(String::new()));
            }
            Ok(Event::Text(e)) if in_title && depth == 2 => {
                let text = e
                    .unescape()
                    .map_err(|err| MetadataError::Parse(format!("SONGTITLE: {err}")))?;
                title.push_str(&text);
            }
            Ok(Event::CData(e)) if in_title && depth == 2 => {
                title.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(_)) => {
                if in_title && depth == 2 {
                    return Ok(Some(title));
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(MetadataError::Parse(format!(
                    "stats XML at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(None)
}
