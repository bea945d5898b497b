//! Lock store persistence adapters.

pub mod connection;
pub mod lock_repository;
pub mod memory;

pub use connection::{create_pool, ConnectionError, PoolConfig};
pub use lock_repository::SqliteLockStore;
pub use memory::{InMemoryLockStore, UnavailableLockStore};
