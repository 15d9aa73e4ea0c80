//! HTTP fetch service used by the status-page readers

pub mod client;

pub use client::{FetchResponse, HttpClient, HttpFetcher};
