use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One classified CI failure from the input report.
///
/// Events are immutable once parsed; a dispatcher run processes them in
/// input order, which gates both the action cap and intra-run dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Failure classification, e.g. `network_error` or `test_timeout`.
    #[serde(rename = "type")]
    pub failure_type: String,

    /// Pipeline, workflow, or job name the failure occurred on.
    pub resource: String,

    /// Free-text diagnostic message from the upstream classifier.
    #[serde(default)]
    pub message: String,
}

impl FailureEvent {
    /// Convenience constructor used heavily in tests.
    pub fn new(
        failure_type: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            failure_type: failure_type.into(),
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// The structured failure report consumed by one dispatcher run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FailureReport {
    /// Ordered failure events, oldest first.
    #[serde(default)]
    pub failures: Vec<FailureEvent>,
}

/// One persisted dedup record: the last time a failure type's handler
/// succeeded, as epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub failure_type: String,
    pub last_run_epoch_seconds: i64,
}

impl LockRecord {
    /// Last-run instant as a UTC timestamp, if representable.
    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.last_run_epoch_seconds, 0)
    }
}
