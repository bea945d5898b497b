//! External-process handler invoker.
//!
//! Executes remediation handlers as child processes, feeding them the
//! serialized event on stdin, and maps every process-level failure to a
//! two-valued invocation result before it reaches the dispatch loop.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::models::{FailureEvent, HandlerCommand, RunMode};
use crate::domain::ports::{HandlerInvoker, Invocation, InvocationStatus};

/// Invoker backed by configured handler executables.
pub struct ProcessInvoker {
    handlers: BTreeMap<String, HandlerCommand>,
}

impl ProcessInvoker {
    /// Build the invoker from the configured handler table.
    pub const fn new(handlers: BTreeMap<String, HandlerCommand>) -> Self {
        Self { handlers }
    }
}

#[async_trait]
impl HandlerInvoker for ProcessInvoker {
    async fn invoke(&self, handler_id: &str, event: &FailureEvent, mode: RunMode) -> Invocation {
        if mode == RunMode::DryRun {
            debug!(handler = handler_id, "dry run, handler not invoked");
            return Invocation::simulated(handler_id);
        }

        let Some(spec) = self.handlers.get(handler_id) else {
            return Invocation::failed(
                Some("handler_not_configured"),
                format!("no executable configured for handler '{handler_id}'"),
            );
        };

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                return Invocation::failed(None, format!("failed to serialize event: {err}"));
            }
        };

        let mut command = Command::new(&spec.command);
        command
            .args(&spec.args)
            .env("REMEDY_FAILURE_TYPE", &event.failure_type)
            .env("REMEDY_RESOURCE", &event.resource)
            .env("REMEDY_MESSAGE", &event.message)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return Invocation::failed(
                    None,
                    format!("failed to spawn handler '{}': {err}", spec.command),
                );
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // Handlers may exit without reading stdin; a broken pipe here
            // is not a failure.
            let _ = stdin.write_all(payload.as_bytes()).await;
        }

        let timeout = Duration::from_secs(spec.timeout_seconds);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Invocation::failed(
                    None,
                    format!("failed to collect handler output: {err}"),
                );
            }
            // The dropped child is killed via kill_on_drop.
            Err(_) => {
                warn!(handler = handler_id, timeout_seconds = spec.timeout_seconds, "handler timed out");
                return Invocation::failed(
                    Some("timeout"),
                    format!(
                        "handler '{handler_id}' exceeded {}s timeout",
                        spec.timeout_seconds
                    ),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let combined = match (stdout.is_empty(), stderr.is_empty()) {
            (false, false) => format!("{stdout}\n{stderr}"),
            (false, true) => stdout,
            (true, false) => stderr,
            (true, true) => String::new(),
        };

        if output.status.success() {
            Invocation {
                status: InvocationStatus::Succeeded,
                output: combined,
                reason: None,
            }
        } else {
            let diagnostic = if combined.is_empty() {
                format!("handler exited with {}", output.status)
            } else {
                combined
            };
            Invocation::failed(None, diagnostic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_handler(script: &str, timeout_seconds: u64) -> HandlerCommand {
        HandlerCommand {
            command: "/bin/sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            timeout_seconds,
        }
    }

    fn invoker_with(handler_id: &str, spec: HandlerCommand) -> ProcessInvoker {
        ProcessInvoker::new([(handler_id.to_string(), spec)].into_iter().collect())
    }

    fn event() -> FailureEvent {
        FailureEvent::new("network_error", "build-job-7", "connection reset")
    }

    #[tokio::test]
    async fn test_dry_run_never_spawns() {
        // A command that would fail loudly if executed.
        let invoker = invoker_with("h", shell_handler("exit 99", 5));
        let invocation = invoker.invoke("h", &event(), RunMode::DryRun).await;

        assert_eq!(invocation.status, InvocationStatus::Succeeded);
        assert!(invocation.output.contains("simulated"));
    }

    #[tokio::test]
    async fn test_zero_exit_is_succeeded() {
        let invoker = invoker_with("h", shell_handler("echo remediated", 5));
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Succeeded);
        assert_eq!(invocation.output, "remediated");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failed_with_stderr() {
        let invoker = invoker_with("h", shell_handler("echo broken >&2; exit 3", 5));
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Failed);
        assert!(invocation.output.contains("broken"));
        assert_eq!(invocation.reason, None);
    }

    #[tokio::test]
    async fn test_timeout_is_failed_with_reason() {
        let invoker = invoker_with("h", shell_handler("sleep 30", 1));
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Failed);
        assert_eq!(invocation.reason.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn test_event_payload_on_stdin() {
        let invoker = invoker_with("h", shell_handler("cat", 5));
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Succeeded);
        let echoed: FailureEvent = serde_json::from_str(&invocation.output).unwrap();
        assert_eq!(echoed, event());
    }

    #[tokio::test]
    async fn test_env_vars_describe_event() {
        let invoker = invoker_with("h", shell_handler("printf '%s' \"$REMEDY_RESOURCE\"", 5));
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.output, "build-job-7");
    }

    #[tokio::test]
    async fn test_unconfigured_handler_is_failed() {
        let invoker = ProcessInvoker::new(BTreeMap::new());
        let invocation = invoker.invoke("ghost", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Failed);
        assert_eq!(invocation.reason.as_deref(), Some("handler_not_configured"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_failed_not_error() {
        let invoker = invoker_with(
            "h",
            HandlerCommand::new("/nonexistent/remediation-handler"),
        );
        let invocation = invoker.invoke("h", &event(), RunMode::Apply).await;

        assert_eq!(invocation.status, InvocationStatus::Failed);
        assert!(invocation.output.contains("failed to spawn"));
    }
}
