use async_trait::async_trait;

use crate::domain::error::LockStoreError;
use crate::domain::models::LockRecord;

/// Port for the durable key-to-timestamp map recording the last time each
/// failure type's remediation succeeded.
///
/// The store is the sole source of deduplication truth and may be shared by
/// independently scheduled dispatcher processes; `set` must therefore be
/// atomic with respect to concurrent `get`/`set` sequences from other
/// processes. Implementations must tolerate an empty store (no prior run).
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Last successful remediation of `failure_type`, as epoch seconds.
    async fn get(&self, failure_type: &str) -> Result<Option<i64>, LockStoreError>;

    /// Record a successful remediation of `failure_type` at `epoch_seconds`,
    /// replacing any prior record.
    async fn set(&self, failure_type: &str, epoch_seconds: i64) -> Result<(), LockStoreError>;

    /// All recorded locks, ordered by failure type.
    async fn list(&self) -> Result<Vec<LockRecord>, LockStoreError>;

    /// Remove the lock for `failure_type`. Returns whether a record existed.
    async fn clear(&self, failure_type: &str) -> Result<bool, LockStoreError>;
}
