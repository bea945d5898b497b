use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while locating or parsing the failure report.
///
/// All of these are fatal: they occur before any dispatch and abort the
/// run with exit code 2.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no report files found in {}", .0.display())]
    NoReports(PathBuf),

    #[error("failed to read report {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed report {}: {}", .path.display(), .source)]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the lock store port.
///
/// The dispatcher never aborts a run on these; the duplicate guard fails
/// open and the degradation is recorded in the audit log.
#[derive(Error, Debug, Clone)]
pub enum LockStoreError {
    #[error("lock store unavailable: {0}")]
    Unavailable(String),
}
