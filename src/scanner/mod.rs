//! LFI scan engine
//!
//! Sweeps every (parameter, payload) pair against a target URL, compares each
//! response with a baseline of the unmodified URL, and aggregates the
//! verdicts into a [`ScanSummary`].

pub mod classifier;
pub mod indicators;
pub mod params;
pub mod payloads;
pub mod progress;
pub mod wordlist;

use crate::error::{ProbeError, Result};
use crate::http::fetcher::{fetch_with_timeout, Fetcher};
use crate::models::{
    Baseline, Detection, ParameterSummary, PayloadCategoryId, ProbeResult, ScanConfig, ScanSummary,
    DEFAULT_LENGTH_DELTA_THRESHOLD, DEFAULT_TIMEOUT_MS,
};
use chrono::Local;
use classifier::{Classifier, Observation};
use futures::stream::{self, StreamExt};
use indicators::IndicatorDetector;
use progress::ScanProgress;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use wordlist::{WordlistCache, WordlistSource};

/// Tuning knobs for a scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub baseline_timeout: Duration,
    pub request_timeout: Duration,
    pub length_delta_threshold: f64,
    /// Probes in flight at once
    pub concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            baseline_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            length_delta_threshold: DEFAULT_LENGTH_DELTA_THRESHOLD,
            concurrency: 10,
        }
    }
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            baseline_timeout: Duration::from_millis(config.baseline_timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            length_delta_threshold: config.length_delta_threshold,
            concurrency: config.concurrency.max(1),
        }
    }
}

/// One cell of the parameter x payload matrix
struct ProbeTask<'a> {
    parameter: &'a str,
    original_value: Option<&'a str>,
    payload: &'a str,
    test_url: String,
}

/// Runs LFI scans through a [`Fetcher`]
pub struct ScanEngine<F: Fetcher> {
    fetcher: F,
    options: ScanOptions,
    detector: IndicatorDetector,
    classifier: Classifier,
    progress: Arc<ScanProgress>,
}

impl<F: Fetcher> ScanEngine<F> {
    pub fn new(fetcher: F, options: ScanOptions) -> Self {
        let classifier = Classifier::new(options.length_delta_threshold);
        Self {
            fetcher,
            options,
            detector: IndicatorDetector::new(),
            classifier,
            progress: Arc::new(ScanProgress::new()),
        }
    }

    /// Replaces the progress counter, e.g. with one bound to a terminal bar
    pub fn with_progress(mut self, progress: Arc<ScanProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Shared handle to the live `(current, total)` counter
    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Builds the payload list for a scan: the catalog selection, unioned with
    /// the wordlist when one is configured and loads. A wordlist failure is
    /// logged and the catalog is used on its own.
    pub async fn prepare_payloads(
        &self,
        categories: &[PayloadCategoryId],
        wordlist: Option<(&WordlistSource, &WordlistCache)>,
        cap: usize,
    ) -> Vec<String> {
        let catalog = payloads::build_payload_list(categories);

        let external = match wordlist {
            Some((source, cache)) => {
                match cache
                    .get_or_load(source, &self.fetcher, self.options.request_timeout)
                    .await
                {
                    Ok(words) => Some(words),
                    Err(e) => {
                        warn!("{e}; using the built-in catalog only");
                        None
                    }
                }
            }
            None => None,
        };

        let list = payloads::merge_payloads(catalog, external, cap);
        info!("Prepared {} payloads", list.len());
        list
    }

    /// Runs the full parameter x payload sweep against `target`.
    ///
    /// Fails only for an unusable target URL or when no parameters can be
    /// determined; both are checked before any request is made.
    pub async fn run(
        &self,
        target: &str,
        parameter_names: &[String],
        payloads: &[String],
    ) -> Result<ScanSummary> {
        let started_at = Local::now();
        let url = params::parse_target(target)?;
        let parameters = params::resolve_parameters(&url, parameter_names)?;

        let originals: Vec<Option<String>> = parameters
            .iter()
            .map(|p| params::original_value(&url, p))
            .collect();
        for (name, value) in parameters.iter().zip(&originals) {
            if value.is_none() {
                debug!("Parameter '{name}' is not on the target URL; it will be appended");
            }
        }

        let total_tests = parameters.len() * payloads.len();
        self.progress.start(total_tests);
        info!(
            "Scanning {} parameter(s) with {} payload(s) ({} tests) against {}",
            parameters.len(),
            payloads.len(),
            total_tests,
            url
        );

        let baseline = self.fetch_baseline(&url).await;

        let tasks: Vec<ProbeTask<'_>> = parameters
            .iter()
            .zip(&originals)
            .flat_map(|(param, original)| {
                let url = &url;
                payloads.iter().map(move |payload| ProbeTask {
                    parameter: param.as_str(),
                    original_value: original.as_deref(),
                    payload: payload.as_str(),
                    test_url: params::build_test_url(url, param, payload),
                })
            })
            .collect();

        // `buffered` yields in submission order, so results stay
        // parameter-major / payload-minor.
        let results: Vec<ProbeResult> = stream::iter(tasks)
            .map(|task| self.probe(task, baseline))
            .buffered(self.options.concurrency.max(1))
            .filter_map(|r| async move { r })
            .collect()
            .await;

        self.progress.finish();

        let parameter_summaries: Vec<ParameterSummary> = parameters
            .iter()
            .zip(originals)
            .map(|(name, original_value)| ParameterSummary {
                vulnerable_count: results
                    .iter()
                    .filter(|r| r.vulnerable && &r.parameter == name)
                    .count(),
                name: name.clone(),
                original_value,
                total_tests: payloads.len(),
            })
            .collect();

        let vulnerable_count = results.iter().filter(|r| r.vulnerable).count();
        info!(
            "Scan finished: {} responses, {} flagged, {} of {} probes failed",
            results.len(),
            vulnerable_count,
            total_tests.saturating_sub(results.len()),
            total_tests
        );

        Ok(ScanSummary {
            target: target.to_string(),
            parameters: parameter_summaries,
            total_tests,
            vulnerable_count,
            results,
            baseline,
            payload_count: payloads.len(),
            started_at,
            finished_at: Local::now(),
        })
    }

    /// Fetches the unmodified target once. Failure leaves the baseline empty.
    async fn fetch_baseline(&self, url: &Url) -> Baseline {
        match fetch_with_timeout(&self.fetcher, url.as_str(), self.options.baseline_timeout).await
        {
            Ok(resp) => {
                debug!("Baseline: status {} length {}", resp.status, resp.body.len());
                Baseline::new(resp.status, resp.body.len())
            }
            Err(e) => {
                let err = ProbeError::BaselineUnavailable(e.to_string());
                warn!("{err}; classifying on indicators only");
                Baseline::unavailable()
            }
        }
    }

    async fn probe(&self, task: ProbeTask<'_>, baseline: Baseline) -> Option<ProbeResult> {
        let outcome =
            fetch_with_timeout(&self.fetcher, &task.test_url, self.options.request_timeout).await;
        self.progress
            .advance(&format!("{} = {}", task.parameter, task.payload));

        let resp = match outcome {
            Ok(resp) => resp,
            Err(e) => {
                let err = ProbeError::ProbeRequestFailed {
                    url: task.test_url,
                    reason: e.to_string(),
                };
                debug!("{err}");
                return None;
            }
        };

        let indicators = self.detector.detect(&resp.body);
        let (detection, confidence) = self.classifier.classify(&Observation {
            indicators: &indicators,
            baseline,
            status: resp.status,
            length: resp.body.len(),
        });

        if detection != Detection::NotVulnerable {
            info!(
                "{detection} ({confidence}) on '{}' with payload {}",
                task.parameter, task.payload
            );
        }

        Some(ProbeResult::new(
            task.parameter,
            task.original_value.map(str::to_string),
            task.test_url,
            task.payload,
            resp.status,
            &resp.body,
            indicators,
            detection,
            confidence,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchedResponse;
    use crate::models::Confidence;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Returns scripted responses keyed by URL; unknown URLs fail
    struct ScriptedFetcher {
        responses: HashMap<String, (u16, String)>,
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchedResponse> {
            self.responses
                .get(url)
                .map(|(s, b)| FetchedResponse::new(*s, b.clone()))
                .ok_or_else(|| ProbeError::ConfigError(format!("no script for {url}")))
        }
    }

    fn engine(responses: &[(&str, u16, &str)]) -> ScanEngine<ScriptedFetcher> {
        let responses = responses
            .iter()
            .map(|(u, s, b)| (u.to_string(), (*s, b.to_string())))
            .collect();
        ScanEngine::new(ScriptedFetcher { responses }, ScanOptions::default())
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_requests() {
        let e = engine(&[]);
        let result = e.run("index.php?file=a", &[], &["x".to_string()]).await;
        assert!(matches!(result, Err(ProbeError::InvalidUrl(_))));
        assert_eq!(e.progress().snapshot(), (0, 0));
    }

    #[tokio::test]
    async fn test_no_parameters_fails_fast() {
        let e = engine(&[]);
        let result = e.run("https://example.com/", &[], &["x".to_string()]).await;
        assert!(matches!(result, Err(ProbeError::NoParametersFound)));
    }

    #[tokio::test]
    async fn test_results_keep_matrix_order() {
        let base = "https://example.com/?a=1&b=2";
        let e = engine(&[
            (base, 200, "home"),
            ("https://example.com/?a=x&b=2", 200, "home"),
            ("https://example.com/?a=y&b=2", 200, "home"),
            ("https://example.com/?a=1&b=x", 200, "home"),
            ("https://example.com/?a=1&b=y", 200, "root:x:0:0:root"),
        ]);
        let payloads = vec!["x".to_string(), "y".to_string()];
        let summary = e.run(base, &[], &payloads).await.expect("scan");

        let order: Vec<(&str, &str)> = summary
            .results
            .iter()
            .map(|r| (r.parameter.as_str(), r.payload.as_str()))
            .collect();
        assert_eq!(order, vec![("a", "x"), ("a", "y"), ("b", "x"), ("b", "y")]);
        assert_eq!(summary.results[3].detection, Detection::ConfirmedLfi);
        assert_eq!(summary.results[3].confidence, Confidence::High);
        assert_eq!(summary.vulnerable_count, 1);
        assert_eq!(summary.parameters[0].vulnerable_count, 0);
        assert_eq!(summary.parameters[1].vulnerable_count, 1);
    }

    #[tokio::test]
    async fn test_prepare_payloads_without_wordlist() {
        let e = engine(&[]);
        let list = e
            .prepare_payloads(&[PayloadCategoryId::NullByte], None, 5)
            .await;
        assert_eq!(list.len(), 5);
        assert_eq!(list, payloads::build_payload_list(&[PayloadCategoryId::NullByte])[..5]);
    }

    #[tokio::test]
    async fn test_prepare_payloads_falls_back_when_wordlist_fails() {
        let e = engine(&[]);
        let cache = WordlistCache::new();
        let source = WordlistSource::parse("https://lists.example.com/lfi.txt");
        let list = e
            .prepare_payloads(&[], Some((&source, &cache)), 500)
            .await;
        assert_eq!(list, payloads::build_payload_list(&[]));
    }

    #[tokio::test]
    async fn test_prepare_payloads_merges_wordlist() {
        let e = engine(&[(
            "https://lists.example.com/lfi.txt",
            200,
            "../../../etc/passwd\n/custom/secret\n",
        )]);
        let cache = WordlistCache::new();
        let source = WordlistSource::parse("https://lists.example.com/lfi.txt");
        let list = e
            .prepare_payloads(&[PayloadCategoryId::BasicTraversal], Some((&source, &cache)), 500)
            .await;
        let catalog = payloads::build_payload_list(&[PayloadCategoryId::BasicTraversal]);
        assert_eq!(list.len(), catalog.len() + 1);
        assert_eq!(list.last().map(String::as_str), Some("/custom/secret"));
    }
}
