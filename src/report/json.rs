//! JSON report export

use crate::error::Result;
use crate::models::{EndpointInfo, ScanSummary};
use std::path::Path;
use tracing::info;

/// Exports a scan summary as a pretty-printed JSON file
pub fn export(summary: &ScanSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(output_path, json)?;
    info!("JSON report saved to {}", output_path.display());
    Ok(())
}

/// Loads a ScanSummary from a JSON file
pub fn load(input_path: &Path) -> Result<ScanSummary> {
    let content = std::fs::read_to_string(input_path)?;
    let summary: ScanSummary = serde_json::from_str(&content)?;
    Ok(summary)
}

/// Exports extracted endpoints as a JSON array
pub fn export_endpoints(endpoints: &[EndpointInfo], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(endpoints)?;
    std::fs::write(output_path, json)?;
    info!("JSON endpoint list saved to {}", output_path.display());
    Ok(())
}
