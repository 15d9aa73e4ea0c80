//! Test doubles shared by the unit tests

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::error::{MetadataError, Result};
use crate::network::{FetchResponse, HttpFetcher};
use crate::stream::endpoint::StreamEndpoint;
use crate::stream::transport::{Connector, IcyStream};

// --- ICY ---

/// A 200 response with `empty_frames` metadata-less frames, then one frame
/// carrying `meta`. Audio bytes are 0xFF so a misaligned skip reads a huge
/// length byte and runs off the end of the script.
pub fn icy_response(metaint: usize, empty_frames: usize, meta: &str) -> Vec<u8> {
    let mut out = format!("ICY 200 OK\r\nicy-name: Test FM\r\nicy-metaint: {metaint}\r\n\r\n")
        .into_bytes();
    for _ in 0..empty_frames {
        out.extend(std::iter::repeat(0xFF).take(metaint));
        out.push(0);
    }
    out.extend(std::iter::repeat(0xFF).take(metaint));

    let mut block = meta.as_bytes().to_vec();
    let padded = block.len().div_ceil(16) * 16;
    block.resize(padded, 0);
    out.push((padded / 16) as u8);
    out.extend(block);
    out
}

pub fn redirect_response(location: &str) -> Vec<u8> {
    format!("HTTP/1.0 302 Found\r\nLocation: {location}\r\nConnection: close\r\n\r\n").into_bytes()
}

/// Connector serving canned responses per host, recording what happened
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: HashMap<String, Vec<u8>>,
    connects: Mutex<Vec<String>>,
    requests: Mutex<Vec<Arc<Mutex<Vec<u8>>>>>,
    open: Arc<AtomicUsize>,
    max_open_at_connect: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, host: &str, response: Vec<u8>) -> Self {
        self.scripts.insert(host.to_string(), response);
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.connects.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| String::from_utf8_lossy(&r.lock().unwrap()).into_owned())
            .collect()
    }

    /// Highest number of live streams seen when a new connection was opened
    pub fn max_open_at_connect(&self) -> usize {
        self.max_open_at_connect.load(Ordering::SeqCst)
    }

    pub fn open_streams(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, endpoint: &StreamEndpoint, _timeout: Duration) -> Result<Box<dyn IcyStream>> {
        let host = endpoint.socket_address.host().to_string();
        self.connects.lock().unwrap().push(host.clone());
        self.max_open_at_connect
            .fetch_max(self.open.load(Ordering::SeqCst), Ordering::SeqCst);

        let script = self.scripts.get(&host).ok_or_else(|| MetadataError::Connect {
            address: endpoint.socket_address.to_string(),
            port: endpoint.port,
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "no script"),
        })?;

        let written = Arc::new(Mutex::new(Vec::new()));
        self.requests.lock().unwrap().push(written.clone());
        self.open.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedStream {
            input: Cursor::new(script.clone()),
            written,
            open: self.open.clone(),
        }))
    }
}

struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    written: Arc<Mutex<Vec<u8>>>,
    open: Arc<AtomicUsize>,
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

// --- HTTP ---

/// Fetcher serving canned responses per URL; unknown URLs are 404
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, FetchResponse>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, url: &str, content: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            FetchResponse {
                content: content.to_string(),
                status_code: 200,
                message: "OK".to_string(),
            },
        );
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl HttpFetcher for ScriptedFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse> {
        self.fetched.lock().unwrap().push(url.to_string());
        Ok(self.responses.get(url).cloned().unwrap_or(FetchResponse {
            content: "<html>Not Found</html>".to_string(),
            status_code: 404,
            message: "Not Found".to_string(),
        }))
    }
}

// --- logging ---

/// Layer recording every event's level and message
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<(Level, String)>>>);

impl CapturedLogs {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedLogs {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Run `f` with a subscriber that captures everything it logs
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(logs.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs)
}
