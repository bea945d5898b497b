//! In-memory and degraded lock store adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::error::LockStoreError;
use crate::domain::models::LockRecord;
use crate::domain::ports::LockStore;

/// Process-local lock store used by tests and ad-hoc simulation setups.
///
/// Provides the port's atomicity trivially (single process, single map);
/// cross-process deduplication requires the SQLite adapter.
#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    records: RwLock<HashMap<String, i64>>,
}

impl InMemoryLockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records, for test assertions.
    pub async fn snapshot(&self) -> HashMap<String, i64> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn get(&self, failure_type: &str) -> Result<Option<i64>, LockStoreError> {
        Ok(self.records.read().await.get(failure_type).copied())
    }

    async fn set(&self, failure_type: &str, epoch_seconds: i64) -> Result<(), LockStoreError> {
        self.records
            .write()
            .await
            .insert(failure_type.to_string(), epoch_seconds);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LockRecord>, LockStoreError> {
        let records = self.records.read().await;
        let mut out: Vec<LockRecord> = records
            .iter()
            .map(|(failure_type, last_run)| LockRecord {
                failure_type: failure_type.clone(),
                last_run_epoch_seconds: *last_run,
            })
            .collect();
        out.sort_by(|a, b| a.failure_type.cmp(&b.failure_type));
        Ok(out)
    }

    async fn clear(&self, failure_type: &str) -> Result<bool, LockStoreError> {
        Ok(self.records.write().await.remove(failure_type).is_some())
    }
}

/// Lock store stand-in used when the real store cannot be opened.
///
/// Every operation fails with the recorded reason so the duplicate guard
/// fails open per event instead of the run aborting.
#[derive(Debug, Clone)]
pub struct UnavailableLockStore {
    reason: String,
}

impl UnavailableLockStore {
    /// Remember why the real store could not be opened.
    pub const fn new(reason: String) -> Self {
        Self { reason }
    }

    fn error(&self) -> LockStoreError {
        LockStoreError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl LockStore for UnavailableLockStore {
    async fn get(&self, _failure_type: &str) -> Result<Option<i64>, LockStoreError> {
        Err(self.error())
    }

    async fn set(&self, _failure_type: &str, _epoch_seconds: i64) -> Result<(), LockStoreError> {
        Err(self.error())
    }

    async fn list(&self) -> Result<Vec<LockRecord>, LockStoreError> {
        Err(self.error())
    }

    async fn clear(&self, _failure_type: &str) -> Result<bool, LockStoreError> {
        Err(self.error())
    }
}
