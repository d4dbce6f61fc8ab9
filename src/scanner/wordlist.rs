//! External payload wordlists (local file or remote URL)

use crate::error::{ProbeError, Result};
use crate::http::fetcher::{fetch_with_timeout, Fetcher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Where an extra wordlist comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordlistSource {
    File(PathBuf),
    Remote(String),
}

impl WordlistSource {
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            WordlistSource::Remote(trimmed.to_string())
        } else {
            WordlistSource::File(PathBuf::from(trimmed))
        }
    }

    /// Reads and splits the wordlist. Remote lists are fetched through the
    /// same fetcher the scan uses.
    pub async fn load<F>(&self, fetcher: &F, timeout: Duration) -> Result<Vec<String>>
    where
        F: Fetcher + ?Sized,
    {
        let content = match self {
            WordlistSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                ProbeError::WordlistUnavailable(format!("{}: {e}", path.display()))
            })?,
            WordlistSource::Remote(url) => {
                let response = fetch_with_timeout(fetcher, url, timeout)
                    .await
                    .map_err(|e| ProbeError::WordlistUnavailable(format!("{url}: {e}")))?;
                if !(200..300).contains(&response.status) {
                    return Err(ProbeError::WordlistUnavailable(format!(
                        "{url}: HTTP {}",
                        response.status
                    )));
                }
                response.body
            }
        };

        let lines = parse_wordlist(&content);
        if lines.is_empty() {
            return Err(ProbeError::WordlistUnavailable(format!("{self:?} is empty")));
        }
        debug!("Loaded {} wordlist entries from {self:?}", lines.len());
        Ok(lines)
    }
}

/// Newline-delimited entries without blanks or `#` comments
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.to_string())
        .collect()
}

/// Holds a wordlist for the lifetime of the process after the first
/// successful load. Failed loads are not cached, so a later scan retries.
#[derive(Debug, Default)]
pub struct WordlistCache {
    cell: OnceCell<Vec<String>>,
}

impl WordlistCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<F>(
        &self,
        source: &WordlistSource,
        fetcher: &F,
        timeout: Duration,
    ) -> Result<&[String]>
    where
        F: Fetcher + ?Sized,
    {
        let words = self
            .cell
            .get_or_try_init(|| async {
                info!("Loading wordlist from {source:?}");
                source.load(fetcher, timeout).await
            })
            .await?;
        Ok(words.as_slice())
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchedResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        status: u16,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchedResponse::new(self.status, "../a\n\n# skip\n ../b \n"))
        }
    }

    #[test]
    fn test_parse_source() {
        assert_eq!(
            WordlistSource::parse("https://example.com/lfi.txt"),
            WordlistSource::Remote("https://example.com/lfi.txt".to_string())
        );
        assert_eq!(
            WordlistSource::parse("lists/lfi.txt"),
            WordlistSource::File(PathBuf::from("lists/lfi.txt"))
        );
    }

    #[tokio::test]
    async fn test_remote_loaded_once() {
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
            status: 200,
        };
        let cache = WordlistCache::new();
        let source = WordlistSource::parse("https://example.com/lfi.txt");

        let first = cache
            .get_or_load(&source, &fetcher, Duration::from_secs(1))
            .await
            .expect("load")
            .to_vec();
        let second = cache
            .get_or_load(&source, &fetcher, Duration::from_secs(1))
            .await
            .expect("load")
            .to_vec();

        assert_eq!(first, vec!["../a", "../b"]);
        assert_eq!(first, second);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_error_status_is_unavailable() {
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
            status: 404,
        };
        let cache = WordlistCache::new();
        let source = WordlistSource::parse("https://example.com/missing.txt");
        let result = cache
            .get_or_load(&source, &fetcher, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(ProbeError::WordlistUnavailable(_))));
        assert!(!cache.is_loaded());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let fetcher = CountingFetcher {
            calls: AtomicUsize::new(0),
            status: 200,
        };
        let source = WordlistSource::parse("/nonexistent/lfiprobe/wordlist.txt");
        let result = source.load(&fetcher, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProbeError::WordlistUnavailable(_))));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }
}
