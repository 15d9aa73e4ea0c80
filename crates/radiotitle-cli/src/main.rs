//! Radiotitle CLI: print what internet radio stations are playing

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::unbounded;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use radiotitle::config::icy::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REDIRECTS};
use radiotitle::config::network::READ_TIMEOUT_SECS;
use radiotitle::{MetadataMethod, RadioMetadata};

#[derive(Parser)]
#[command(
    name = "radiotitle",
    about = "Print the now-playing title of internet radio streams",
    version
)]
struct Cli {
    /// Where to read the title: shoutcast-v1, shoutcast-v2, icecast or icy
    method: MetadataMethod,

    /// Stream URLs, queried in parallel
    #[arg(required = true)]
    urls: Vec<String>,

    /// Metadata frames to inspect before giving up (icy)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u32,

    /// Redirects to follow (icy)
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    redirects: u32,

    /// Socket connect/read timeout in seconds (icy)
    #[arg(long, default_value_t = READ_TIMEOUT_SECS)]
    timeout: u64,

    /// Log failures at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

struct Lookup {
    index: usize,
    url: String,
    title: Option<String>,
}

/// Filter used when `RUST_LOG` is unset
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "radiotitle=debug"
    } else {
        "warn"
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let radio = match RadioMetadata::new() {
        Ok(radio) => Arc::new(radio.with_timeout(Duration::from_secs(cli.timeout))),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // One independent exchange per station
    let (tx, rx) = unbounded::<Lookup>();
    for (index, url) in cli.urls.iter().cloned().enumerate() {
        let tx = tx.clone();
        let radio = radio.clone();
        let (method, attempts, redirects) = (cli.method, cli.attempts, cli.redirects);
        thread::spawn(move || {
            debug!(%url, %method, "reading title");
            let title = match method {
                MetadataMethod::Icy => radio.read_icy_metadata(&url, attempts, redirects),
                other => radio.read(other, &url),
            };
            let _ = tx.send(Lookup { index, url, title });
        });
    }
    drop(tx);

    let mut lookups: Vec<Lookup> = rx.iter().collect();
    lookups.sort_by_key(|l| l.index);

    let mut found = false;
    for lookup in &lookups {
        found |= lookup.title.is_some();
        println!("{}\t{}", lookup.url, lookup.title.as_deref().unwrap_or("-"));
    }

    if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
