//! ICY in-band metadata reader
//!
//! Speaks just enough HTTP over a raw socket to ask the server for in-band
//! metadata (`Icy-MetaData: 1`), then hops from one metadata block to the
//! next by discarding `icy-metaint` bytes of audio each time.
//!
//! ```text
//! [head ... \r\n\r\n][audio x metaint][len][len*16 bytes meta][audio x metaint][len]...
//! ```

use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::trace;
use url::Url;

use crate::config::icy::{HEAD_CHUNK_SIZE, MAX_METAINT};
use crate::config::network::USER_AGENT;
use crate::error::{MetadataError, Result};
use crate::stream::endpoint::StreamEndpoint;
use crate::stream::metadata::MetadataBlock;
use crate::stream::scan::find_following;
use crate::stream::transport::Connector;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Outcome of the status line of an ICY response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadStatus {
    Ok,
    Found,
    Other,
}

/// Response head of an ICY request, plus any audio that arrived with it
#[derive(Debug, Clone)]
pub struct ResponseHead {
    lines: Vec<String>,
    body_prefix: Vec<u8>,
}

impl ResponseHead {
    /// Read the response head from a fresh connection.
    ///
    /// Reads until the blank line ending the head is buffered or
    /// `HEAD_CHUNK_SIZE` bytes have arrived. Whatever follows the blank line
    /// in that buffer is audio and is kept in `body_prefix`.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buf = Vec::with_capacity(HEAD_CHUNK_SIZE);
        let mut chunk = [0u8; HEAD_CHUNK_SIZE];
        let mut eof = false;

        while buf.len() < HEAD_CHUNK_SIZE && find_terminator(&buf).is_none() {
            match reader.read(&mut chunk[..HEAD_CHUNK_SIZE - buf.len()]) {
                Ok(0) => {
                    eof = true;
                    break;
                }
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if buf.is_empty() {
            return Err(MetadataError::Parse("empty response".to_string()));
        }

        let head_end = match find_terminator(&buf) {
            Some(end) => end,
            // Connection closed early: everything we got is head
            None if eof => buf.len(),
            None => {
                return Err(MetadataError::Parse(format!(
                    "response head exceeds {HEAD_CHUNK_SIZE} bytes"
                )))
            }
        };

        Ok(Self::from_parts(&buf[..head_end], buf[head_end..].to_vec()))
    }

    fn from_parts(head: &[u8], body_prefix: Vec<u8>) -> Self {
        let lines = String::from_utf8_lossy(head)
            .split('\n')
            .map(str::to_string)
            .collect();
        Self { lines, body_prefix }
    }

    pub fn status_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    pub fn status(&self) -> HeadStatus {
        let line = self.status_line();
        if line.contains("200 OK") {
            HeadStatus::Ok
        } else if line.contains("302 Found") {
            HeadStatus::Found
        } else {
            HeadStatus::Other
        }
    }

    /// Number of audio bytes that were read together with the head
    pub fn consumed_body(&self) -> usize {
        self.body_prefix.len()
    }

    /// Validated `icy-metaint` value.
    ///
    /// A missing or unparsable header counts as 0, which is out of range.
    pub fn metaint(&self) -> Result<usize> {
        let raw = find_following(&self.lines, "icy-metaint:").unwrap_or("0");
        let interval = raw.trim().parse::<i64>().unwrap_or(0);
        if interval <= 0 || interval > MAX_METAINT {
            return Err(MetadataError::IntervalOutOfRange(interval));
        }
        Ok(interval as usize)
    }

    /// Redirect target, resolved against the URL that produced this head
    pub fn location(&self, current_url: &str) -> Option<String> {
        let raw = find_following(&self.lines, "Location: ")?.trim_end_matches('\r');
        if raw.is_empty() {
            return None;
        }
        match Url::parse(current_url).and_then(|base| base.join(raw)) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(_) => Some(raw.to_string()),
        }
    }

    pub fn into_body<R: Read>(self, inner: R) -> IcyBody<R> {
        IcyBody::new(self.body_prefix, inner)
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
        .map(|p| p + HEAD_TERMINATOR.len())
}

/// Stream body positioned right after the response head.
///
/// `carried` holds the audio bytes that were pulled off the wire together
/// with the head. They are served before anything is read from `inner`, so
/// the first skip of `metaint` bytes only discards
/// `metaint - carried.len()` bytes from the socket.
pub struct IcyBody<R> {
    carried: Vec<u8>,
    pos: usize,
    inner: R,
}

impl<R: Read> IcyBody<R> {
    pub fn new(carried: Vec<u8>, inner: R) -> Self {
        Self {
            carried,
            pos: 0,
            inner,
        }
    }

    /// Carried bytes not yet consumed
    pub fn carried_remaining(&self) -> usize {
        self.carried.len() - self.pos
    }

    /// Discard `n` bytes of audio. Returns how many came from the socket.
    pub fn skip(&mut self, n: usize) -> Result<u64> {
        let from_carry = n.min(self.carried_remaining());
        self.pos += from_carry;

        let from_wire = (n - from_carry) as u64;
        let skipped = io::copy(&mut (&mut self.inner).take(from_wire), &mut io::sink())?;
        if skipped < from_wire {
            return Err(MetadataError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended after {skipped} of {from_wire} audio bytes"),
            )));
        }
        Ok(from_wire)
    }

    /// Skip to the next metadata block and read it, `None` if the frame has none
    pub fn next_block(&mut self, interval: usize) -> Result<Option<MetadataBlock>> {
        let wire = self.skip(interval)?;
        trace!(interval, wire, "skipped audio");
        MetadataBlock::read_from(self)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for IcyBody<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.carried_remaining();
        if remaining > 0 {
            let n = buf.len().min(remaining);
            buf[..n].copy_from_slice(&self.carried[self.pos..self.pos + n]);
            self.pos += n;
            return Ok(n);
        }
        self.inner.read(buf)
    }
}

/// Inspect up to `max_attempts` metadata frames, stopping at the first title.
///
/// Returns `Some("")` when the station sent an explicitly empty title.
pub fn read_title<R: Read>(
    body: &mut IcyBody<R>,
    interval: usize,
    max_attempts: u32,
) -> Result<Option<String>> {
    for attempt in 0..max_attempts {
        if let Some(block) = body.next_block(interval)? {
            if let Some(title) = block.stream_title() {
                trace!(attempt, "found StreamTitle");
                return Ok(Some(title));
            }
        }
    }
    Ok(None)
}

/// Build the minimal HTTP/1.1 request asking for in-band metadata
pub fn build_request(endpoint: &StreamEndpoint) -> String {
    let default_port = if endpoint.socket_address.is_tls() { 443 } else { 80 };
    let host = if endpoint.port == default_port {
        endpoint.hostname.clone()
    } else {
        format!("{}:{}", endpoint.hostname, endpoint.port)
    };

    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Accept: */*\r\n\
         User-Agent: {}\r\n\
         Icy-MetaData: 1\r\n\
         Connection: Close\r\n\r\n",
        endpoint.pathname, host, USER_AGENT
    )
}

enum Exchange {
    Title(Option<String>),
    Redirect(String),
}

/// Reads the ICY title of a stream over a raw connection
pub struct IcyReader<'a> {
    connector: &'a dyn Connector,
    timeout: Duration,
}

impl<'a> IcyReader<'a> {
    pub fn new(connector: &'a dyn Connector, timeout: Duration) -> Self {
        Self { connector, timeout }
    }

    /// Read the current title, following at most `max_redirect` 302 responses.
    ///
    /// Each hop opens a fresh connection; the previous one is closed first.
    pub fn read_title(
        &self,
        url: &str,
        max_attempts: u32,
        max_redirect: u32,
    ) -> Result<Option<String>> {
        let mut url = url.to_string();
        let mut redirects_left = max_redirect;

        loop {
            match self.exchange(&url, max_attempts)? {
                Exchange::Title(title) => return Ok(title),
                Exchange::Redirect(_) if redirects_left == 0 => {
                    return Err(MetadataError::RedirectExhausted(url));
                }
                Exchange::Redirect(location) => {
                    trace!(from = %url, to = %location, redirects_left, "following redirect");
                    redirects_left -= 1;
                    url = location;
                }
            }
        }
    }

    /// One connection: handshake, head, and either the frame loop or a redirect.
    /// The socket is dropped (closed) when this returns, on every path.
    fn exchange(&self, url: &str, max_attempts: u32) -> Result<Exchange> {
        let endpoint = StreamEndpoint::parse(url)?;
        let mut stream = self.connector.connect(&endpoint, self.timeout)?;

        stream.write_all(build_request(&endpoint).as_bytes())?;
        stream.flush()?;

        let head = ResponseHead::read_from(&mut stream)?;
        match head.status() {
            HeadStatus::Ok => {
                let interval = head.metaint()?;
                trace!(
                    interval,
                    consumed = head.consumed_body(),
                    "ICY stream accepted"
                );
                let mut body = head.into_body(stream);
                read_title(&mut body, interval, max_attempts).map(Exchange::Title)
            }
            HeadStatus::Found => head
                .location(url)
                .map(Exchange::Redirect)
                .ok_or_else(|| MetadataError::Parse("302 without Location".to_string())),
            HeadStatus::Other => Err(status_error(head.status_line())),
        }
    }
}

fn status_error(status_line: &str) -> MetadataError {
    let mut parts = status_line.trim_end().splitn(3, ' ');
    let _version = parts.next();
    let status_code = parts.next().and_then(|c| c.parse().ok()).unwrap_or(0);
    let message = parts.next().unwrap_or("").to_string();
    MetadataError::HttpStatus {
        status_code,
        message,
    }
}
