//! Core data models for lfiprobe

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;

/// Number of body characters kept on each probe result as evidence
pub const BODY_SAMPLE_CHARS: usize = 300;

/// Identifier of a payload category in the static catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadCategoryId {
    BasicTraversal,
    DeepTraversal,
    NullByte,
    EncodingBypass,
    OsLinux,
    OsWindows,
}

impl PayloadCategoryId {
    /// All category ids in declaration order
    pub const ALL: [PayloadCategoryId; 6] = [
        PayloadCategoryId::BasicTraversal,
        PayloadCategoryId::DeepTraversal,
        PayloadCategoryId::NullByte,
        PayloadCategoryId::EncodingBypass,
        PayloadCategoryId::OsLinux,
        PayloadCategoryId::OsWindows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadCategoryId::BasicTraversal => "basic-traversal",
            PayloadCategoryId::DeepTraversal => "deep-traversal",
            PayloadCategoryId::NullByte => "null-byte",
            PayloadCategoryId::EncodingBypass => "encoding-bypass",
            PayloadCategoryId::OsLinux => "os-linux",
            PayloadCategoryId::OsWindows => "os-windows",
        }
    }
}

impl fmt::Display for PayloadCategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadCategoryId {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        PayloadCategoryId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ProbeError::ConfigError(format!("Unknown payload category '{s}'")))
    }
}

/// A named group of LFI payload strings
#[derive(Debug)]
pub struct PayloadCategory {
    pub id: PayloadCategoryId,
    pub label: &'static str,
    pub description: &'static str,
    pub payloads: &'static [&'static str],
}

/// Detection verdict for a single probe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Detection {
    ConfirmedLfi,
    PossibleLfi,
    Suspicious,
    NotVulnerable,
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::ConfirmedLfi => write!(f, "CONFIRMED_LFI"),
            Detection::PossibleLfi => write!(f, "POSSIBLE_LFI"),
            Detection::Suspicious => write!(f, "SUSPICIOUS"),
            Detection::NotVulnerable => write!(f, "NOT_VULNERABLE"),
        }
    }
}

/// Coarse trust level attached to a detection verdict
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

/// Snapshot of the unmodified target response.
/// Both fields are `None` when the baseline request failed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Baseline {
    pub status: Option<u16>,
    pub length: Option<usize>,
}

impl Baseline {
    pub fn new(status: u16, length: usize) -> Self {
        Self {
            status: Some(status),
            length: Some(length),
        }
    }

    /// Baseline for a scan whose unmodified request failed
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.status.is_some() || self.length.is_some()
    }
}

/// One response to one (parameter, payload) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub parameter: String,
    /// Value present on the target URL, `None` when the parameter was injected
    pub original_value: Option<String>,
    pub test_url: String,
    pub payload: String,
    pub status: u16,
    /// Response body length in bytes
    pub content_length: usize,
    pub indicators: Vec<String>,
    pub vulnerable: bool,
    pub detection: Detection,
    pub confidence: Confidence,
    pub body_sample: String,
}

impl ProbeResult {
    /// Builds a result, deriving `vulnerable` from the detection verdict
    /// and cutting the body down to the evidence sample.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        parameter: impl Into<String>,
        original_value: Option<String>,
        test_url: impl Into<String>,
        payload: impl Into<String>,
        status: u16,
        body: &str,
        indicators: Vec<String>,
        detection: Detection,
        confidence: Confidence,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            original_value,
            test_url: test_url.into(),
            payload: payload.into(),
            status,
            content_length: body.len(),
            indicators,
            vulnerable: detection != Detection::NotVulnerable,
            detection,
            confidence,
            body_sample: body.chars().take(BODY_SAMPLE_CHARS).collect(),
        }
    }
}

/// Per-parameter aggregate of a finished scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterSummary {
    pub name: String,
    pub original_value: Option<String>,
    pub total_tests: usize,
    pub vulnerable_count: usize,
}

/// Result of a complete LFI scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Target URL as supplied by the caller
    pub target: String,
    pub parameters: Vec<ParameterSummary>,
    /// Planned matrix size: parameters x payloads
    pub total_tests: usize,
    pub vulnerable_count: usize,
    /// Probe results in parameter-major, payload-minor order
    pub results: Vec<ProbeResult>,
    pub baseline: Baseline,
    pub payload_count: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl ScanSummary {
    /// Returns results with a detection other than NOT_VULNERABLE
    pub fn findings(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.vulnerable)
    }

    /// Returns count of results with the given detection
    pub fn count_by_detection(&self, detection: Detection) -> usize {
        self.results
            .iter()
            .filter(|r| r.detection == detection)
            .count()
    }

    /// Probes that produced no response (errors and timeouts)
    pub fn failed_count(&self) -> usize {
        self.total_tests.saturating_sub(self.results.len())
    }
}

/// Coarse classification of an extracted endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Api,
    Page,
    Static,
    Unknown,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Api => write!(f, "api"),
            EndpointKind::Page => write!(f, "page"),
            EndpointKind::Static => write!(f, "static"),
            EndpointKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A candidate endpoint found in HTML or script text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointInfo {
    /// URL or path with query string and fragment removed
    pub url: String,
    pub kind: EndpointKind,
    /// HTTP method, when the call site names one
    pub method: Option<String>,
    /// Where the text came from (page, inline script, script URL)
    pub source: String,
}

/// Configuration for a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target URL to scan
    pub target: String,
    /// Explicit parameters to test; empty means discover from the query string
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Payload categories; empty means all
    #[serde(default)]
    pub categories: Vec<PayloadCategoryId>,
    /// Maximum number of payloads per parameter
    pub max_payloads: usize,
    /// Extra newline-delimited wordlist (file path or http(s) URL)
    pub wordlist: Option<String>,
    /// Timeout for the unmodified baseline request
    pub baseline_timeout_ms: u64,
    /// Timeout for each probe request
    pub request_timeout_ms: u64,
    /// Relative body length change that counts as a possible LFI
    pub length_delta_threshold: f64,
    /// Number of probes in flight at once
    pub concurrency: usize,
    /// User-Agent header value
    pub user_agent: String,
    /// Whether to follow HTTP redirects
    pub follow_redirects: bool,
    /// HTTP/HTTPS proxy URL
    pub proxy: Option<String>,
    /// Custom HTTP headers
    pub headers: HashMap<String, String>,
    /// Maximum requests per second
    pub rate_limit: Option<u32>,
}

pub const DEFAULT_MAX_PAYLOADS: usize = 500;
pub const MIN_MAX_PAYLOADS: usize = 50;
pub const MAX_MAX_PAYLOADS: usize = 5000;
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_LENGTH_DELTA_THRESHOLD: f64 = 0.3;

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            parameters: Vec::new(),
            categories: Vec::new(),
            max_payloads: DEFAULT_MAX_PAYLOADS,
            wordlist: None,
            baseline_timeout_ms: DEFAULT_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            length_delta_threshold: DEFAULT_LENGTH_DELTA_THRESHOLD,
            concurrency: 10,
            user_agent: "lfiprobe/0.1.0".to_string(),
            follow_redirects: true,
            proxy: None,
            headers: HashMap::new(),
            rate_limit: None,
        }
    }
}
