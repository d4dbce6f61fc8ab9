//! Configuration management for lfiprobe

use crate::error::{ProbeError, Result};
use crate::models::{PayloadCategoryId, ScanConfig, MAX_MAX_PAYLOADS, MIN_MAX_PAYLOADS};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// File-based configuration structure
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    payloads: Option<PayloadsSection>,
    http: Option<HttpSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    parameters: Option<Vec<String>>,
    baseline_timeout_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    length_delta_threshold: Option<f64>,
    concurrency: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PayloadsSection {
    categories: Option<Vec<String>>,
    max_payloads: Option<usize>,
    wordlist: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HttpSection {
    user_agent: Option<String>,
    follow_redirects: Option<bool>,
    proxy: Option<String>,
    rate_limit: Option<u32>,
    headers: Option<std::collections::HashMap<String, String>>,
}

/// Parses category ids, failing on the first unknown one
pub fn parse_categories(names: &[String]) -> Result<Vec<PayloadCategoryId>> {
    names.iter().map(|n| n.parse()).collect()
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path).map_err(ProbeError::IoError)?;
    parse_config(&content)
}

/// Parses TOML configuration text on top of the defaults
pub fn parse_config(content: &str) -> Result<ScanConfig> {
    let file_config: FileConfig = toml::from_str(content)?;
    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(parameters) = scan.parameters {
            config.parameters = parameters;
        }
        if let Some(timeout) = scan.baseline_timeout_ms {
            config.baseline_timeout_ms = timeout;
        }
        if let Some(timeout) = scan.request_timeout_ms {
            config.request_timeout_ms = timeout;
        }
        if let Some(threshold) = scan.length_delta_threshold {
            config.length_delta_threshold = threshold;
        }
        if let Some(concurrency) = scan.concurrency {
            config.concurrency = concurrency;
        }
    }

    if let Some(payloads) = file_config.payloads {
        if let Some(categories) = payloads.categories {
            config.categories = parse_categories(&categories)?;
        }
        if let Some(max) = payloads.max_payloads {
            config.max_payloads = max;
        }
        if payloads.wordlist.is_some() {
            config.wordlist = payloads.wordlist;
        }
    }

    if let Some(http) = file_config.http {
        if let Some(ua) = http.user_agent {
            config.user_agent = ua;
        }
        if let Some(follow) = http.follow_redirects {
            config.follow_redirects = follow;
        }
        if http.proxy.is_some() {
            config.proxy = http.proxy;
        }
        if let Some(rate) = http.rate_limit {
            config.rate_limit = Some(rate);
        }
        if let Some(headers) = http.headers {
            config.headers.extend(headers);
        }
    }

    validate(&mut config)?;
    Ok(config)
}

/// Command-line overrides, all optional
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub parameters: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub max_payloads: Option<usize>,
    pub wordlist: Option<String>,
    pub baseline_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub length_delta_threshold: Option<f64>,
    pub concurrency: Option<usize>,
    pub proxy: Option<String>,
    pub rate_limit: Option<u32>,
    pub headers: Option<Vec<String>>,
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(config: &mut ScanConfig, target: String, cli: CliOverrides) -> Result<()> {
    config.target = target;

    if let Some(p) = cli.parameters {
        config.parameters = p;
    }
    if let Some(c) = cli.categories {
        config.categories = parse_categories(&c)?;
    }
    if let Some(m) = cli.max_payloads {
        config.max_payloads = m;
    }
    if let Some(w) = cli.wordlist {
        config.wordlist = Some(w);
    }
    if let Some(t) = cli.baseline_timeout_ms {
        config.baseline_timeout_ms = t;
    }
    if let Some(t) = cli.request_timeout_ms {
        config.request_timeout_ms = t;
    }
    if let Some(t) = cli.length_delta_threshold {
        config.length_delta_threshold = t;
    }
    if let Some(c) = cli.concurrency {
        config.concurrency = c;
    }
    if let Some(p) = cli.proxy {
        config.proxy = Some(p);
    }
    if let Some(r) = cli.rate_limit {
        config.rate_limit = Some(r);
    }
    if let Some(h) = cli.headers {
        for header in h {
            if let Some((key, value)) = header.split_once(':') {
                config
                    .headers
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    validate(config)
}

/// Clamps the payload cap into its allowed range and rejects nonsense values
pub fn validate(config: &mut ScanConfig) -> Result<()> {
    let clamped = config.max_payloads.clamp(MIN_MAX_PAYLOADS, MAX_MAX_PAYLOADS);
    if clamped != config.max_payloads {
        warn!(
            "max_payloads {} out of range {MIN_MAX_PAYLOADS}-{MAX_MAX_PAYLOADS}, using {clamped}",
            config.max_payloads
        );
        config.max_payloads = clamped;
    }

    if !config.length_delta_threshold.is_finite() || config.length_delta_threshold < 0.0 {
        return Err(ProbeError::ConfigError(format!(
            "length_delta_threshold must be a non-negative number, got {}",
            config.length_delta_threshold
        )));
    }
    if config.baseline_timeout_ms == 0 || config.request_timeout_ms == 0 {
        return Err(ProbeError::ConfigError(
            "timeouts must be greater than zero".to_string(),
        ));
    }
    if config.concurrency == 0 {
        config.concurrency = 1;
    }
    Ok(())
}
