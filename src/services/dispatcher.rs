//! The dispatch control loop.
//!
//! Processes failure events strictly in input order, running each through
//! the policy table and guard chain before handler invocation, subject to
//! a run-wide action cap. Only this service writes lock state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::{
    ExecutionOutcome, FailureEvent, OutcomeStatus, RunMode, RunSummary, SkipReason,
};
use crate::domain::ports::{HandlerInvoker, InvocationStatus, LockStore};
use crate::infrastructure::logging::audit::{
    AuditAction, AuditLogger, AuditRecord, AuditSeverity,
};
use crate::services::guards::{GuardChain, GuardVerdict};
use crate::services::policy_table::PolicyTable;

/// Per-run dispatcher wiring the policy table, guard chain, lock store,
/// handler invoker, and audit trail together.
pub struct Dispatcher {
    policies: PolicyTable,
    guards: GuardChain,
    locks: Arc<dyn LockStore>,
    invoker: Arc<dyn HandlerInvoker>,
    audit: AuditLogger,
    max_actions: usize,
}

impl Dispatcher {
    /// Assemble a dispatcher from its collaborators.
    pub fn new(
        policies: PolicyTable,
        guards: GuardChain,
        locks: Arc<dyn LockStore>,
        invoker: Arc<dyn HandlerInvoker>,
        audit: AuditLogger,
        max_actions: usize,
    ) -> Self {
        Self {
            policies,
            guards,
            locks,
            invoker,
            audit,
            max_actions,
        }
    }

    /// Process `events` in input order and aggregate the run summary.
    ///
    /// A handler failure never aborts the run; each event lands in exactly
    /// one terminal state. Lock state is written only on success and only
    /// in apply mode.
    pub async fn run(&self, events: Vec<FailureEvent>, mode: RunMode) -> RunSummary {
        let run_id = Uuid::new_v4();
        info!(%run_id, %mode, events = events.len(), "dispatch run started");
        self.audit_or_warn(
            AuditRecord::new(run_id, AuditAction::RunStarted, AuditSeverity::Info)
                .with_mode(mode)
                .with_detail(format!("{} events", events.len())),
        )
        .await;

        let mut outcomes = Vec::with_capacity(events.len());
        // Failure types that succeeded in this run, with their dispatch
        // timestamps. Mirrors lock store writes so intra-run dedup holds in
        // dry-run mode without touching the store.
        let mut session_locks: HashMap<String, i64> = HashMap::new();
        let mut executed = 0usize;

        for event in events {
            // The cap is absolute: once reached, remaining events are not
            // guard-evaluated at all.
            if executed >= self.max_actions {
                debug!(failure_type = %event.failure_type, "action cap reached, skipping");
                self.audit_or_warn(
                    AuditRecord::new(run_id, AuditAction::GuardRejected, AuditSeverity::Info)
                        .with_mode(mode)
                        .with_event(&event)
                        .with_detail(SkipReason::MaxActionsReached.as_str()),
                )
                .await;
                outcomes.push(ExecutionOutcome::skipped(
                    event,
                    None,
                    mode,
                    SkipReason::MaxActionsReached,
                ));
                continue;
            }

            let Some(handler_id) = self.policies.lookup(&event.failure_type) else {
                debug!(failure_type = %event.failure_type, "no policy mapping");
                self.audit_or_warn(
                    AuditRecord::new(run_id, AuditAction::GuardRejected, AuditSeverity::Info)
                        .with_mode(mode)
                        .with_event(&event)
                        .with_detail(SkipReason::NoMapping.as_str()),
                )
                .await;
                outcomes.push(ExecutionOutcome::skipped(
                    event,
                    None,
                    mode,
                    SkipReason::NoMapping,
                ));
                continue;
            };
            let handler_id = handler_id.to_string();

            let now = Utc::now().timestamp();
            let check = self
                .guards
                .evaluate(&event, now, self.locks.as_ref(), &session_locks)
                .await;

            if let Some(degradation) = check.degradation {
                warn!(error = %degradation, "lock store degraded, proceeding without dedup");
                self.audit_or_warn(
                    AuditRecord::new(run_id, AuditAction::LockStoreDegraded, AuditSeverity::Warning)
                        .with_mode(mode)
                        .with_event(&event)
                        .with_detail(degradation.to_string()),
                )
                .await;
            }

            if let GuardVerdict::Rejected(reason) = check.verdict {
                info!(failure_type = %event.failure_type, resource = %event.resource, %reason, "guard rejected event");
                self.audit_or_warn(
                    AuditRecord::new(run_id, AuditAction::GuardRejected, AuditSeverity::Info)
                        .with_mode(mode)
                        .with_event(&event)
                        .with_handler(handler_id.clone())
                        .with_detail(reason.as_str()),
                )
                .await;
                outcomes.push(ExecutionOutcome::skipped(
                    event,
                    Some(handler_id),
                    mode,
                    reason,
                ));
                continue;
            }

            executed += 1;
            info!(failure_type = %event.failure_type, handler = %handler_id, %mode, "dispatching handler");
            self.audit_or_warn(
                AuditRecord::new(run_id, AuditAction::HandlerDispatched, AuditSeverity::Info)
                    .with_mode(mode)
                    .with_event(&event)
                    .with_handler(handler_id.clone()),
            )
            .await;

            let invocation = self.invoker.invoke(&handler_id, &event, mode).await;
            let outcome = match invocation.status {
                InvocationStatus::Succeeded => {
                    if mode == RunMode::Apply {
                        if let Err(err) = self.locks.set(&event.failure_type, now).await {
                            warn!(error = %err, failure_type = %event.failure_type, "failed to record lock");
                            self.audit_or_warn(
                                AuditRecord::new(
                                    run_id,
                                    AuditAction::LockStoreDegraded,
                                    AuditSeverity::Warning,
                                )
                                .with_mode(mode)
                                .with_event(&event)
                                .with_detail(err.to_string()),
                            )
                            .await;
                        } else {
                            self.audit_or_warn(
                                AuditRecord::new(
                                    run_id,
                                    AuditAction::LockRecorded,
                                    AuditSeverity::Info,
                                )
                                .with_mode(mode)
                                .with_event(&event),
                            )
                            .await;
                        }
                    }
                    session_locks.insert(event.failure_type.clone(), now);
                    self.audit_or_warn(
                        AuditRecord::new(run_id, AuditAction::HandlerSucceeded, AuditSeverity::Info)
                            .with_mode(mode)
                            .with_event(&event)
                            .with_handler(handler_id.clone()),
                    )
                    .await;
                    ExecutionOutcome {
                        event,
                        handler_id: Some(handler_id),
                        mode,
                        status: OutcomeStatus::Succeeded,
                        reason: invocation.reason,
                        output: Some(invocation.output),
                    }
                }
                InvocationStatus::Failed => {
                    // No lock write: a failed remediation must not suppress
                    // future retries.
                    warn!(failure_type = %event.failure_type, handler = %handler_id, reason = ?invocation.reason, "handler failed");
                    self.audit_or_warn(
                        AuditRecord::new(run_id, AuditAction::HandlerFailed, AuditSeverity::Error)
                            .with_mode(mode)
                            .with_event(&event)
                            .with_handler(handler_id.clone())
                            .with_detail(
                                invocation.reason.clone().unwrap_or_else(|| "nonzero exit".to_string()),
                            ),
                    )
                    .await;
                    ExecutionOutcome {
                        event,
                        handler_id: Some(handler_id),
                        mode,
                        status: OutcomeStatus::Failed,
                        reason: invocation.reason,
                        output: Some(invocation.output),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let summary = RunSummary::from_outcomes(mode, executed, outcomes);
        info!(
            %run_id,
            executed = summary.total_executed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "dispatch run completed"
        );
        self.audit_or_warn(
            AuditRecord::new(run_id, AuditAction::RunCompleted, AuditSeverity::Info)
                .with_mode(mode)
                .with_detail(format!(
                    "executed={} succeeded={} failed={} skipped={}",
                    summary.total_executed, summary.succeeded, summary.failed, summary.skipped
                )),
        )
        .await;
        summary
    }

    /// Audit failures are logged but never abort the run.
    async fn audit_or_warn(&self, record: AuditRecord) {
        if let Err(err) = self.audit.record(record).await {
            warn!(error = %err, "audit write failed");
        }
    }
}
