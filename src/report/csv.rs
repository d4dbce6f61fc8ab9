//! CSV report export
//!
//! Every field is wrapped in double quotes, with embedded quotes doubled.

use crate::error::Result;
use crate::models::{EndpointInfo, ScanSummary};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const SCAN_HEADER: [&str; 9] = [
    "Parameter",
    "Original Value",
    "Detection",
    "Confidence",
    "Payload",
    "Indicators",
    "Status",
    "Content Length",
    "Tested URL",
];

pub const ENDPOINT_HEADER: [&str; 4] = ["URL", "Type", "Method", "Source"];

/// Quotes a field, doubling any embedded quotes
fn escape_csv(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders one row per probe result
pub fn render(summary: &ScanSummary) -> String {
    let mut lines = vec![row(SCAN_HEADER)];

    for r in &summary.results {
        lines.push(row([
            r.parameter.clone(),
            r.original_value.clone().unwrap_or_default(),
            r.detection.to_string(),
            r.confidence.to_string(),
            r.payload.clone(),
            r.indicators.join("; "),
            r.status.to_string(),
            r.content_length.to_string(),
            r.test_url.clone(),
        ]));
    }

    lines.join("\n") + "\n"
}

/// Renders one row per endpoint
pub fn render_endpoints(endpoints: &[EndpointInfo]) -> String {
    let mut lines = vec![row(ENDPOINT_HEADER)];
    for e in endpoints {
        lines.push(row([
            e.url.as_str(),
            e.kind.to_string().as_str(),
            e.method.as_deref().unwrap_or(""),
            e.source.as_str(),
        ]));
    }
    lines.join("\n") + "\n"
}

/// Exports scan results as a CSV file
pub fn export(summary: &ScanSummary, output_path: &Path) -> Result<()> {
    write_file(output_path, &render(summary))?;
    info!("CSV report saved to {}", output_path.display());
    Ok(())
}

/// Exports endpoints as a CSV file
pub fn export_endpoints(endpoints: &[EndpointInfo], output_path: &Path) -> Result<()> {
    write_file(output_path, &render_endpoints(endpoints))?;
    info!("CSV endpoint list saved to {}", output_path.display());
    Ok(())
}

fn write_file(output_path: &Path, content: &str) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    Ok(())
}
