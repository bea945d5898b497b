use async_trait::async_trait;

use crate::domain::models::{FailureEvent, RunMode};

/// Result of invoking one remediation handler.
///
/// Process-level failures are mapped to this two-valued result at the
/// boundary; they never propagate as errors into the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Whether the handler signalled success (exit code 0).
    pub status: InvocationStatus,
    /// Captured diagnostic output, verbatim.
    pub output: String,
    /// Failure qualifier such as `timeout`, when one applies.
    pub reason: Option<String>,
}

/// Two-valued handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    Succeeded,
    Failed,
}

impl Invocation {
    /// A succeeded-shaped invocation synthesized in dry-run mode.
    pub fn simulated(handler_id: &str) -> Self {
        Self {
            status: InvocationStatus::Succeeded,
            output: format!("simulated: handler '{handler_id}' not invoked (dry run)"),
            reason: None,
        }
    }

    /// A failed invocation with a qualifier and diagnostic output.
    pub fn failed(reason: Option<&str>, output: impl Into<String>) -> Self {
        Self {
            status: InvocationStatus::Failed,
            output: output.into(),
            reason: reason.map(String::from),
        }
    }
}

/// Port for executing a remediation handler.
///
/// In apply mode the adapter spawns the external handler process with the
/// serialized event and a bounded timeout. In dry-run mode it must perform
/// no side effects and synthesize a simulated success.
#[async_trait]
pub trait HandlerInvoker: Send + Sync {
    /// Invoke `handler_id` for `event` under `mode`.
    async fn invoke(&self, handler_id: &str, event: &FailureEvent, mode: RunMode) -> Invocation;
}
