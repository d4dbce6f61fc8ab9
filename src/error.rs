//! Error types for lfiprobe

use thiserror::Error;

/// Main error type for lfiprobe operations
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid target URL '{0}'")]
    InvalidUrl(String),

    #[error("No parameters found to test (none supplied and the target URL has no query string)")]
    NoParametersFound,

    #[error("Wordlist unavailable: {0}")]
    WordlistUnavailable(String),

    #[error("Baseline request failed: {0}")]
    BaselineUnavailable(String),

    #[error("Probe request to {url} failed: {reason}")]
    ProbeRequestFailed { url: String, reason: String },

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProbeError {
    /// Whether this error aborts a scan. Everything else degrades the result.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProbeError::InvalidUrl(_) | ProbeError::NoParametersFound)
    }
}

/// Result type alias for lfiprobe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
