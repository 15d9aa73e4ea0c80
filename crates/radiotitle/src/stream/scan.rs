//! Key/value scanning over line-oriented text
//!
//! Shared by the ICY response-head parser (`icy-metaint:`, `Location: `) and
//! the metadata-block parser (`StreamTitle=`).

/// Return the text following `key` in the first line that contains it.
///
/// The key may appear anywhere in the line; the remainder is returned as-is,
/// without trimming.
pub fn find_following<'a, I, S>(lines: I, key: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    lines.into_iter().find_map(|line| {
        let line = line.as_ref();
        line.find(key).map(|pos| &line[pos + key.len()..])
    })
}
