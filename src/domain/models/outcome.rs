use serde::{Deserialize, Serialize};

use super::event::FailureEvent;

/// Execution mode for one dispatcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Simulate only: lock store is read but never written, no handler
    /// process is spawned.
    DryRun,
    /// Side-effect-performing execution.
    Apply,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry_run"),
            Self::Apply => write!(f, "apply"),
        }
    }
}

/// Terminal status of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Why an event was skipped instead of dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No policy entry maps this failure type to a handler.
    NoMapping,
    /// The event's resource matched the protected denylist.
    ProtectedWorkflow,
    /// The failure type's handler ran within the cooldown window.
    DuplicatePrevention,
    /// The run-wide action cap was already reached.
    MaxActionsReached,
}

impl SkipReason {
    /// Stable reason string recorded in outcomes and the audit log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMapping => "no_mapping",
            Self::ProtectedWorkflow => "protected_workflow",
            Self::DuplicatePrevention => "duplicate_prevention",
            Self::MaxActionsReached => "max_actions_reached",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of how one input event was handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// The event this outcome belongs to.
    pub event: FailureEvent,
    /// Handler the policy table resolved, if lookup got that far.
    pub handler_id: Option<String>,
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Terminal status.
    pub status: OutcomeStatus,
    /// Concrete skip or failure reason, when there is one.
    pub reason: Option<String>,
    /// Captured handler output, when a handler was invoked.
    pub output: Option<String>,
}

impl ExecutionOutcome {
    /// Build a skipped outcome with its concrete reason string.
    pub fn skipped(
        event: FailureEvent,
        handler_id: Option<String>,
        mode: RunMode,
        reason: SkipReason,
    ) -> Self {
        Self {
            event,
            handler_id,
            mode,
            status: OutcomeStatus::Skipped,
            reason: Some(reason.as_str().to_string()),
            output: None,
        }
    }
}

/// Aggregated, immutable result of one dispatcher run.
///
/// Deliberately carries no timestamps or run ids: identical inputs must
/// render byte-identically in dry-run mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Handlers actually dispatched (never exceeds the action cap).
    pub total_executed: usize,
    /// Outcomes with status `succeeded`.
    pub succeeded: usize,
    /// Outcomes with status `failed`.
    pub failed: usize,
    /// Outcomes with status `skipped`.
    pub skipped: usize,
    /// One outcome per input event, in input order.
    pub outcomes: Vec<ExecutionOutcome>,
}

impl RunSummary {
    /// Aggregate per-event outcomes into the final summary.
    pub fn from_outcomes(mode: RunMode, total_executed: usize, outcomes: Vec<ExecutionOutcome>) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for outcome in &outcomes {
            match outcome.status {
                OutcomeStatus::Succeeded => succeeded += 1,
                OutcomeStatus::Failed => failed += 1,
                OutcomeStatus::Skipped => skipped += 1,
            }
        }
        Self {
            mode,
            total_executed,
            succeeded,
            failed,
            skipped,
            outcomes,
        }
    }

    /// Whether the run's final exit signal is failure.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Process exit code for this run: `1` iff at least one outcome failed.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }
}

/// Output format for the result reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-readable JSON.
    Structured,
    /// Human-readable operator text.
    Narrative,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let event = FailureEvent::new("network_error", "build-job-7", "connection reset");
        let outcomes = vec![
            ExecutionOutcome {
                event: event.clone(),
                handler_id: Some("clear_cache_handler".to_string()),
                mode: RunMode::Apply,
                status: OutcomeStatus::Succeeded,
                reason: None,
                output: Some("cache cleared".to_string()),
            },
            ExecutionOutcome::skipped(event.clone(), None, RunMode::Apply, SkipReason::NoMapping),
            ExecutionOutcome {
                event,
                handler_id: Some("rerun_tests_handler".to_string()),
                mode: RunMode::Apply,
                status: OutcomeStatus::Failed,
                reason: Some("timeout".to_string()),
                output: None,
            },
        ];

        let summary = RunSummary::from_outcomes(RunMode::Apply, 2, outcomes);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_executed, 2);
        assert!(summary.has_failures());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_skip_reason_strings() {
        assert_eq!(SkipReason::NoMapping.as_str(), "no_mapping");
        assert_eq!(SkipReason::ProtectedWorkflow.as_str(), "protected_workflow");
        assert_eq!(SkipReason::DuplicatePrevention.as_str(), "duplicate_prevention");
        assert_eq!(SkipReason::MaxActionsReached.as_str(), "max_actions_reached");
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&RunMode::DryRun).unwrap(), "\"dry_run\"");
        assert_eq!(serde_json::to_string(&RunMode::Apply).unwrap(), "\"apply\"");
    }
}
