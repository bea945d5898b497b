//! Guard chain applied to every failure event before dispatch.
//!
//! Two predicates run in a fixed order, short-circuiting on the first
//! rejection: the protected-resource guard, then the duplicate guard.
//! Both are side-effect-free; only the dispatcher writes state.

use std::collections::HashMap;

use crate::domain::error::LockStoreError;
use crate::domain::models::{FailureEvent, SkipReason};
use crate::domain::ports::LockStore;

/// Rejects events targeting a denylisted pipeline or workflow.
#[derive(Debug, Clone)]
pub struct ProtectedResourceGuard {
    patterns: Vec<String>,
}

impl ProtectedResourceGuard {
    /// Build the guard from configured substring patterns.
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Whether `resource` matches any protected pattern. Pure, no I/O.
    pub fn is_protected(&self, resource: &str) -> bool {
        self.patterns.iter().any(|pattern| resource.contains(pattern))
    }
}

/// Rejects events whose failure type ran within the cooldown window.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateGuard {
    cooldown_seconds: i64,
}

impl DuplicateGuard {
    /// Build the guard with the configured cooldown window.
    pub const fn new(cooldown_seconds: i64) -> Self {
        Self { cooldown_seconds }
    }

    /// Whether `failure_type` is still inside its cooldown window at `now`.
    ///
    /// Consults the in-run success map before the durable store so two
    /// occurrences of one type within a run are mutually exclusive in both
    /// modes. An empty or missing store reads as "no prior run".
    pub async fn is_duplicate(
        &self,
        failure_type: &str,
        now: i64,
        store: &dyn LockStore,
        session_locks: &HashMap<String, i64>,
    ) -> Result<bool, LockStoreError> {
        if let Some(last_run) = session_locks.get(failure_type) {
            if self.within_cooldown(*last_run, now) {
                return Ok(true);
            }
        }

        match store.get(failure_type).await? {
            Some(last_run) => Ok(self.within_cooldown(last_run, now)),
            None => Ok(false),
        }
    }

    fn within_cooldown(&self, last_run: i64, now: i64) -> bool {
        now - last_run < self.cooldown_seconds
    }
}

/// Verdict of the chain for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Event stays eligible for dispatch.
    Allowed,
    /// Event must be skipped with the given reason.
    Rejected(SkipReason),
}

/// Chain result, carrying any lock store degradation observed on the way.
#[derive(Debug)]
pub struct GuardCheck {
    /// The chain's verdict.
    pub verdict: GuardVerdict,
    /// Set when the duplicate guard failed open on a store error.
    pub degradation: Option<LockStoreError>,
}

/// Composable filter chain: protected-resource check first, duplicate
/// check second.
#[derive(Debug, Clone)]
pub struct GuardChain {
    protected: ProtectedResourceGuard,
    duplicate: DuplicateGuard,
}

impl GuardChain {
    /// Build the chain from configured patterns and cooldown.
    pub fn new(protected_patterns: Vec<String>, cooldown_seconds: i64) -> Self {
        Self {
            protected: ProtectedResourceGuard::new(protected_patterns),
            duplicate: DuplicateGuard::new(cooldown_seconds),
        }
    }

    /// Evaluate both guards for `event`, short-circuiting on rejection.
    ///
    /// A lock store failure does not reject: the event stays eligible and
    /// the error is surfaced in `degradation` for the dispatcher to audit.
    pub async fn evaluate(
        &self,
        event: &FailureEvent,
        now: i64,
        store: &dyn LockStore,
        session_locks: &HashMap<String, i64>,
    ) -> GuardCheck {
        if self.protected.is_protected(&event.resource) {
            return GuardCheck {
                verdict: GuardVerdict::Rejected(SkipReason::ProtectedWorkflow),
                degradation: None,
            };
        }

        match self
            .duplicate
            .is_duplicate(&event.failure_type, now, store, session_locks)
            .await
        {
            Ok(true) => GuardCheck {
                verdict: GuardVerdict::Rejected(SkipReason::DuplicatePrevention),
                degradation: None,
            },
            Ok(false) => GuardCheck {
                verdict: GuardVerdict::Allowed,
                degradation: None,
            },
            // Fail open: deduplication is a safety net, not a correctness
            // guarantee.
            Err(err) => GuardCheck {
                verdict: GuardVerdict::Allowed,
                degradation: Some(err),
            },
        }
    }
}
