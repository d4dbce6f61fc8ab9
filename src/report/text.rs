//! Plain-text report

use crate::error::Result;
use crate::models::{EndpointInfo, ScanSummary};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const SEPARATOR: &str = "------------------------------------------------------------";

/// Renders the human-readable scan report
pub fn render(summary: &ScanSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "LFI Scan Report");
    let _ = writeln!(out, "Target: {}", summary.target);
    let _ = writeln!(
        out,
        "Started: {}  Finished: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S"),
        summary.finished_at.format("%Y-%m-%d %H:%M:%S")
    );
    match (summary.baseline.status, summary.baseline.length) {
        (Some(status), Some(length)) => {
            let _ = writeln!(out, "Baseline: status {status}, {length} bytes");
        }
        _ => {
            let _ = writeln!(out, "Baseline: unavailable (indicator matches only)");
        }
    }

    let _ = writeln!(out, "\nParameters:");
    for p in &summary.parameters {
        let _ = writeln!(
            out,
            "  {} (original: {}) - {} tests, {} vulnerable",
            p.name,
            p.original_value.as_deref().unwrap_or("<not present>"),
            p.total_tests,
            p.vulnerable_count
        );
    }

    let _ = writeln!(out, "\nTotal tests: {}", summary.total_tests);
    let _ = writeln!(out, "Responses:   {}", summary.results.len());
    let _ = writeln!(out, "Vulnerable:  {}", summary.vulnerable_count);

    for r in &summary.results {
        let _ = writeln!(out, "\n{SEPARATOR}");
        let _ = writeln!(out, "[{}] {} ({})", r.detection, r.parameter, r.confidence);
        let _ = writeln!(out, "Payload:    {}", r.payload);
        let _ = writeln!(out, "URL:        {}", r.test_url);
        let _ = writeln!(out, "Status:     {} ({} bytes)", r.status, r.content_length);
        let indicators = if r.indicators.is_empty() {
            "none".to_string()
        } else {
            r.indicators.join(", ")
        };
        let _ = writeln!(out, "Indicators: {indicators}");
        if !r.body_sample.is_empty() {
            let _ = writeln!(out, "Sample:");
            for line in r.body_sample.lines() {
                let _ = writeln!(out, "  | {line}");
            }
        }
    }

    out
}

/// Renders a plain endpoint listing
pub fn render_endpoints(endpoints: &[EndpointInfo]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Endpoints found: {}", endpoints.len());
    for e in endpoints {
        let _ = writeln!(
            out,
            "{:<7} {:<7} {}  [{}]",
            e.method.as_deref().unwrap_or("-"),
            e.kind,
            e.url,
            e.source
        );
    }
    out
}

/// Exports the text report to a file
pub fn export(summary: &ScanSummary, output_path: &Path) -> Result<()> {
    std::fs::write(output_path, render(summary))?;
    info!("Text report saved to {}", output_path.display());
    Ok(())
}

/// Exports the endpoint listing to a file
pub fn export_endpoints(endpoints: &[EndpointInfo], output_path: &Path) -> Result<()> {
    std::fs::write(output_path, render_endpoints(endpoints))?;
    info!("Text endpoint list saved to {}", output_path.display());
    Ok(())
}
