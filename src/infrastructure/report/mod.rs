//! Failure report loading and discovery.
//!
//! The report is produced upstream by the log classifier; this module only
//! locates and parses it. Any problem here is fatal and aborts the run
//! before any dispatch.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::domain::error::ReportError;
use crate::domain::models::FailureReport;

/// Parse the failure report at `path`.
pub fn load(path: &Path) -> Result<FailureReport, ReportError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReportError::NotFound(path.to_path_buf())
        } else {
            ReportError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let report: FailureReport =
        serde_json::from_str(&contents).map_err(|source| ReportError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), failures = report.failures.len(), "loaded failure report");
    Ok(report)
}

/// Find the most recently modified `*.json` report under `dir`.
pub fn discover_latest(dir: &Path) -> Result<PathBuf, ReportError> {
    let entries = std::fs::read_dir(dir).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ReportError::NoReports(dir.to_path_buf())
        } else {
            ReportError::Unreadable {
                path: dir.to_path_buf(),
                source,
            }
        }
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        match &newest {
            Some((newest_time, _)) if *newest_time >= modified => {}
            _ => newest = Some((modified, path)),
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| ReportError::NoReports(dir.to_path_buf()))
}
