//! Single-page endpoint crawler
//!
//! Fetches one page, then its inline and same-host linked scripts, and runs
//! the endpoint extractor over every text blob.

pub mod extractor;

use crate::error::Result;
use crate::http::fetcher::{fetch_with_timeout, Fetcher};
use crate::models::EndpointInfo;
use crate::scanner::params::parse_target;
use extractor::EndpointExtractor;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Script bodies and references found in a page
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageScripts {
    pub inline: Vec<String>,
    pub linked: Vec<String>,
}

/// Collects inline script bodies and resolved, same-host `<script src>` URLs
pub fn collect_scripts(page_url: &Url, html: &str) -> PageScripts {
    let document = Html::parse_document(html);
    let mut scripts = PageScripts::default();
    let mut seen = HashSet::new();

    if let Ok(selector) = Selector::parse("script") {
        for element in document.select(&selector) {
            match element.value().attr("src") {
                Some(src) => {
                    let Ok(resolved) = page_url.join(src.trim()) else {
                        continue;
                    };
                    if resolved.host_str() != page_url.host_str() {
                        debug!("Skipping off-host script {resolved}");
                        continue;
                    }
                    if seen.insert(resolved.to_string()) {
                        scripts.linked.push(resolved.to_string());
                    }
                }
                None => {
                    let body: String = element.text().collect();
                    if !body.trim().is_empty() {
                        scripts.inline.push(body);
                    }
                }
            }
        }
    }

    scripts
}

/// Crawls one page and its scripts for candidate endpoints
pub struct EndpointCrawler<'a, F: Fetcher> {
    fetcher: &'a F,
    timeout: Duration,
    concurrency: usize,
    extractor: EndpointExtractor,
}

impl<'a, F: Fetcher> EndpointCrawler<'a, F> {
    pub fn new(fetcher: &'a F, timeout: Duration, concurrency: usize) -> Self {
        Self {
            fetcher,
            timeout,
            concurrency: concurrency.max(1),
            extractor: EndpointExtractor::new(),
        }
    }

    /// Returns endpoints from the page, its inline scripts and its linked
    /// scripts, deduplicated by URL with the first occurrence kept.
    /// A failing page fetch is an error; failing scripts are skipped.
    pub async fn crawl(&self, page_url: &str) -> Result<Vec<EndpointInfo>> {
        let url = parse_target(page_url)?;
        info!("Crawling {url} for endpoints");

        let page = fetch_with_timeout(self.fetcher, url.as_str(), self.timeout).await?;
        let scripts = collect_scripts(&url, &page.body);
        debug!(
            "Found {} inline and {} linked scripts",
            scripts.inline.len(),
            scripts.linked.len()
        );

        let mut batches = vec![self.extractor.extract(&page.body, "page")];
        for (i, body) in scripts.inline.iter().enumerate() {
            batches.push(
                self.extractor
                    .extract(body, &format!("inline-script-{}", i + 1)),
            );
        }

        let linked: Vec<Vec<EndpointInfo>> = stream::iter(scripts.linked)
            .map(|script_url| async move {
                match fetch_with_timeout(self.fetcher, &script_url, self.timeout).await {
                    Ok(resp) => self.extractor.extract(&resp.body, &script_url),
                    Err(e) => {
                        debug!("Skipping script {script_url}: {e}");
                        Vec::new()
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;
        batches.extend(linked);

        let endpoints = merge_endpoints(batches);
        info!("Found {} unique endpoints", endpoints.len());
        Ok(endpoints)
    }
}

/// Flattens per-source batches, keeping the first endpoint seen for each URL
pub fn merge_endpoints(batches: Vec<Vec<EndpointInfo>>) -> Vec<EndpointInfo> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|e| seen.insert(e.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EndpointKind;

    #[test]
    fn test_collect_scripts() {
        let base = Url::parse("https://example.com/app/").expect("valid url");
        let html = r#"
            <html><head>
                <script src="/static/main.js"></script>
                <script src="vendor.js"></script>
                <script src="https://cdn.other.com/lib.js"></script>
                <script src="/static/main.js"></script>
                <script>fetch("/api/ping")</script>
                <script>   </script>
            </head></html>
        "#;

        let scripts = collect_scripts(&base, html);
        assert_eq!(
            scripts.linked,
            vec![
                "https://example.com/static/main.js".to_string(),
                "https://example.com/app/vendor.js".to_string(),
            ]
        );
        assert_eq!(scripts.inline.len(), 1);
        assert!(scripts.inline[0].contains("/api/ping"));
    }

    #[test]
    fn test_merge_endpoints_keeps_first_source() {
        let a = EndpointInfo {
            url: "/api/a".to_string(),
            kind: EndpointKind::Api,
            method: None,
            source: "page".to_string(),
        };
        let b = EndpointInfo {
            source: "inline-script-1".to_string(),
            ..a.clone()
        };
        let merged = merge_endpoints(vec![vec![a], vec![b]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, "page");
    }
}
