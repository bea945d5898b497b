//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that infrastructure
//! adapters must implement:
//! - `LockStore`: durable last-remediation timestamps for deduplication
//! - `HandlerInvoker`: execution of external remediation handlers

pub mod invoker;
pub mod lock_store;

pub use invoker::{HandlerInvoker, Invocation, InvocationStatus};
pub use lock_store::LockStore;
