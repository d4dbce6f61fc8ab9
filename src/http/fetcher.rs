//! Fetch capability used by the scan engine and crawler
//!
//! The engine only needs "GET this URL within this timeout". Keeping that
//! behind a trait lets tests drive a scan with scripted responses instead of
//! a live server.

use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Status and body of a completed GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

impl FetchedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Something that can GET a URL with a deadline
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`. Implementations should give up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedResponse>;
}

/// Runs a fetch under a hard deadline regardless of how the fetcher
/// handles its own timeout.
pub async fn fetch_with_timeout<F>(fetcher: &F, url: &str, timeout: Duration) -> Result<FetchedResponse>
where
    F: Fetcher + ?Sized,
{
    match tokio::time::timeout(timeout, fetcher.fetch(url, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(timeout.as_millis() as u64)),
    }
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedResponse> {
        (**self).fetch(url, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Fetcher for Stalled {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedResponse> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(FetchedResponse::new(200, "late"))
        }
    }

    #[tokio::test]
    async fn test_fetch_with_timeout_gives_up() {
        let result = fetch_with_timeout(&Stalled, "http://x/", Duration::from_millis(20)).await;
        assert!(matches!(result, Err(ProbeError::Timeout(20))));
    }
}
