//! lfiprobe - endpoint discovery and heuristic Local File Inclusion probing
//!
//! Crawls a page and its scripts for candidate endpoints, and sweeps a target
//! URL's query parameters with traversal payloads, classifying each response
//! against a baseline of the unmodified URL.

pub mod config;
pub mod crawler;
pub mod error;
pub mod http;
pub mod models;
pub mod report;
pub mod scanner;
