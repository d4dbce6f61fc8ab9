//! HTTP client wrapper with rate limiting and request tracking

use crate::error::{ProbeError, Result};
use crate::http::fetcher::{FetchedResponse, Fetcher};
use crate::models::ScanConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Spaces requests `interval` apart across every clone of the client
#[derive(Debug)]
struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    fn per_second(rps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / rps,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Reserves the next free slot and waits for it
    async fn wait(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}

/// HTTP client wrapper with rate limiting and request counting.
///
/// Requests are sent once; failed probes are dropped by the caller rather
/// than retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_count: Arc<AtomicU64>,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &config.headers {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(val)) => {
                    default_headers.insert(name, val);
                }
                _ => warn!("Ignoring invalid header '{key}'"),
            }
        }

        let timeout_ms = config.baseline_timeout_ms.max(config.request_timeout_ms);
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(&config.user_agent)
            .default_headers(default_headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .cookie_store(true);

        if let Some(ref proxy_url) = config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ProbeError::ConfigError(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        let rate_limiter = config
            .rate_limit
            .filter(|&rps| rps > 0)
            .map(|rps| Arc::new(RateLimiter::per_second(rps)));

        Ok(Self {
            client,
            request_count: Arc::new(AtomicU64::new(0)),
            rate_limiter,
        })
    }

    /// Sends a GET request with a per-request timeout
    pub async fn get_with_timeout(&self, url: &str, timeout: Duration) -> Result<Response> {
        self.send(self.client.get(url).timeout(timeout)).await
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        self.request_count.fetch_add(1, Ordering::Relaxed);

        let response = request.send().await?;
        debug!("Response: {} for {}", response.status(), response.url());
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedResponse> {
        let response = self.get_with_timeout(url, timeout).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedResponse { status, body })
    }
}
