//! HTTP client module for lfiprobe

pub mod client;
pub mod fetcher;
pub use client::HttpClient;
pub use fetcher::{FetchedResponse, Fetcher};
