//! JSON report persistence.

use crate::error::{ScanError, ScanResult};
use crate::scanner::ScanResults;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `results` to `path` as a single pretty-printed JSON object.
pub fn write_report(results: &ScanResults, path: &Path) -> ScanResult<()> {
    let report_error = |reason: String| ScanError::Report {
        path: path.to_path_buf(),
        reason,
    };

    let json = serde_json::to_string_pretty(results).map_err(|e| report_error(e.to_string()))?;
    fs::write(path, json).map_err(|e| report_error(e.to_string()))?;

    info!("report written to {}", path.display());
    Ok(())
}
