//! SQLite implementation of the `LockStore` port.

use std::path::Path;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::error::LockStoreError;
use crate::domain::models::LockRecord;
use crate::domain::ports::LockStore;

use super::connection::{create_pool, PoolConfig};

/// Durable lock store shared by concurrent dispatcher processes.
#[derive(Clone)]
pub struct SqliteLockStore {
    pool: SqlitePool,
}

impl SqliteLockStore {
    /// Wrap an existing pool.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `path` and ensure the schema exists.
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self, LockStoreError> {
        let pool = create_pool(
            path,
            Some(PoolConfig {
                max_connections,
                ..PoolConfig::default()
            }),
        )
        .await
        .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Create the locks table when missing.
    pub async fn migrate(&self) -> Result<(), LockStoreError> {
        sqlx::query(
            r"CREATE TABLE IF NOT EXISTS remediation_locks (
                failure_type TEXT PRIMARY KEY,
                last_run_at INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl LockStore for SqliteLockStore {
    async fn get(&self, failure_type: &str) -> Result<Option<i64>, LockStoreError> {
        let row = sqlx::query("SELECT last_run_at FROM remediation_locks WHERE failure_type = ?")
            .bind(failure_type)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;

        Ok(row.map(|r| r.get::<i64, _>("last_run_at")))
    }

    // Single-statement upsert: atomic with respect to concurrent
    // get/set sequences from other dispatcher processes.
    async fn set(&self, failure_type: &str, epoch_seconds: i64) -> Result<(), LockStoreError> {
        sqlx::query(
            r"INSERT INTO remediation_locks (failure_type, last_run_at)
              VALUES (?, ?)
              ON CONFLICT(failure_type) DO UPDATE SET last_run_at = excluded.last_run_at",
        )
        .bind(failure_type)
        .bind(epoch_seconds)
        .execute(&self.pool)
        .await
        .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LockRecord>, LockStoreError> {
        let rows = sqlx::query(
            "SELECT failure_type, last_run_at FROM remediation_locks ORDER BY failure_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| LockRecord {
                failure_type: row.get("failure_type"),
                last_run_epoch_seconds: row.get("last_run_at"),
            })
            .collect())
    }

    async fn clear(&self, failure_type: &str) -> Result<bool, LockStoreError> {
        let result = sqlx::query("DELETE FROM remediation_locks WHERE failure_type = ?")
            .bind(failure_type)
            .execute(&self.pool)
            .await
            .map_err(|err| LockStoreError::Unavailable(err.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}
