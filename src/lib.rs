//! Remedy - CI Auto-Remediation Dispatcher
//!
//! Remedy consumes a structured report of CI failures and decides, per
//! failure, whether to run a corrective handler. It guarantees the same
//! corrective action never re-runs within a cooldown window, never touches
//! protected pipelines, and performs no side effects in dry-run mode.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, ports, and errors
//! - **Service Layer** (`services`): the dispatch loop, guards, policy
//!   table, and result reporter
//! - **Infrastructure Layer** (`infrastructure`): SQLite lock store,
//!   process invoker, report loading, configuration, audit logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use remedy::services::Dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Assemble a dispatcher and process a failure report
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::error::{LockStoreError, ReportError};
pub use domain::models::{
    Config, ExecutionOutcome, FailureEvent, FailureReport, LockRecord, OutcomeStatus,
    OutputFormat, PolicyEntry, RunMode, RunSummary, SkipReason,
};
pub use domain::ports::{HandlerInvoker, Invocation, InvocationStatus, LockStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Dispatcher, GuardChain, PolicyTable};
