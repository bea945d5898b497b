//! Audit logging for dispatch decisions
//!
//! Provides a durable JSON-lines audit trail, independent of the run
//! summary, for:
//! - guard decisions (rejections, fail-open degradations)
//! - handler dispatches and their outcomes
//! - lock store mutations

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use crate::domain::models::{FailureEvent, RunMode};

/// Append-only audit logger shared across a dispatcher run.
#[derive(Clone)]
pub struct AuditLogger {
    log_file: Arc<Mutex<File>>,
}

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
    Error,
}

/// What happened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    RunStarted,
    GuardRejected,
    HandlerDispatched,
    HandlerSucceeded,
    HandlerFailed,
    LockRecorded,
    LockStoreDegraded,
    LockCleared,
    RunCompleted,
}

/// One audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: AuditSeverity,
    pub run_id: Uuid,
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RunMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditRecord {
    /// Start a record with the mandatory fields; the rest default to absent.
    pub fn new(run_id: Uuid, action: AuditAction, severity: AuditSeverity) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            run_id,
            action,
            mode: None,
            failure_type: None,
            resource: None,
            handler_id: None,
            detail: None,
        }
    }

    /// Attach the run mode.
    pub const fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attach the event's failure type and resource.
    pub fn with_event(mut self, event: &FailureEvent) -> Self {
        self.failure_type = Some(event.failure_type.clone());
        self.resource = Some(event.resource.clone());
        self
    }

    /// Attach the resolved handler id.
    pub fn with_handler(mut self, handler_id: impl Into<String>) -> Self {
        self.handler_id = Some(handler_id.into());
        self
    }

    /// Attach free-text detail (skip reason, error text, counts).
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl AuditLogger {
    /// Create a new audit logger writing to the specified file
    ///
    /// Creates parent directories if they don't exist
    /// Opens file in append mode to preserve existing audit trail
    pub async fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref();

        if let Some(parent) = log_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create audit log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .context("failed to open audit log file")?;

        Ok(Self {
            log_file: Arc::new(Mutex::new(file)),
        })
    }

    /// Append a record as one JSON line
    ///
    /// Also emits a tracing event so decisions show up in structured logs
    pub async fn record(&self, record: AuditRecord) -> Result<()> {
        let json = serde_json::to_string(&record).context("failed to serialize audit record")?;

        {
            let mut file = self
                .log_file
                .lock()
                .map_err(|e| anyhow::anyhow!("audit log mutex poisoned: {}", e))?;

            writeln!(file, "{}", json).context("failed to write audit record")?;
            file.flush().context("failed to flush audit log")?;
        }

        info!(
            action = ?record.action,
            severity = ?record.severity,
            run_id = %record.run_id,
            failure_type = ?record.failure_type,
            resource = ?record.resource,
            handler_id = ?record.handler_id,
            detail = ?record.detail,
            "audit record"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_audit_logger_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");

        let _logger = AuditLogger::new(&log_path).await.unwrap();
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_audit_logger_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs/audit/events.log");

        let _logger = AuditLogger::new(&log_path).await.unwrap();
        assert!(log_path.exists());
        assert!(log_path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_record_writes_json_line() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(&log_path).await.unwrap();
        let run_id = Uuid::new_v4();

        let event = FailureEvent::new("network_error", "build-job-7", "connection reset");
        logger
            .record(
                AuditRecord::new(run_id, AuditAction::GuardRejected, AuditSeverity::Info)
                    .with_mode(RunMode::DryRun)
                    .with_event(&event)
                    .with_detail("protected_workflow"),
            )
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1);

        let record: AuditRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record.run_id, run_id);
        assert_eq!(record.action, AuditAction::GuardRejected);
        assert_eq!(record.failure_type.as_deref(), Some("network_error"));
        assert_eq!(record.resource.as_deref(), Some("build-job-7"));
        assert_eq!(record.detail.as_deref(), Some("protected_workflow"));
    }

    #[tokio::test]
    async fn test_multiple_records_append() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(&log_path).await.unwrap();
        let run_id = Uuid::new_v4();

        logger
            .record(AuditRecord::new(
                run_id,
                AuditAction::RunStarted,
                AuditSeverity::Info,
            ))
            .await
            .unwrap();
        logger
            .record(
                AuditRecord::new(run_id, AuditAction::LockStoreDegraded, AuditSeverity::Warning)
                    .with_detail("lock store unavailable: disk gone"),
            )
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: AuditRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.severity, AuditSeverity::Warning);
        assert_eq!(second.action, AuditAction::LockStoreDegraded);
    }

    #[tokio::test]
    async fn test_concurrent_writes() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("audit.log");
        let logger = AuditLogger::new(&log_path).await.unwrap();

        let mut handles = vec![];
        for _ in 0..10 {
            let logger_clone = logger.clone();
            handles.push(tokio::spawn(async move {
                logger_clone
                    .record(AuditRecord::new(
                        Uuid::new_v4(),
                        AuditAction::HandlerDispatched,
                        AuditSeverity::Info,
                    ))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(contents.lines().count(), 10);
    }
}
