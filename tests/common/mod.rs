//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use lfiprobe::error::{ProbeError, Result};
use lfiprobe::http::{FetchedResponse, Fetcher};
use lfiprobe::models::ScanConfig;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Creates a test ScanConfig pointing to a wiremock server
pub fn test_config(target: &str) -> ScanConfig {
    ScanConfig {
        target: target.to_string(),
        baseline_timeout_ms: 2000,
        request_timeout_ms: 2000,
        concurrency: 4,
        user_agent: "lfiprobe-test/0.1.0".to_string(),
        ..ScanConfig::default()
    }
}

/// In-memory fetcher with per-URL responses, failures and delays.
/// URLs without a script answer with `fallback`.
pub struct ScriptedFetcher {
    responses: HashMap<String, FetchedResponse>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    fallback: FetchedResponse,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(fallback_status: u16, fallback_body: &str) -> Self {
        Self {
            responses: HashMap::new(),
            failing: HashSet::new(),
            delays: HashMap::new(),
            fallback: FetchedResponse::new(fallback_status, fallback_body),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), FetchedResponse::new(status, body));
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedResponse> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(url) {
            return Err(ProbeError::ProbeRequestFailed {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
