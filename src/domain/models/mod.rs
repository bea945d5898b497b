pub mod config;
pub mod event;
pub mod outcome;

pub use config::{
    AuditConfig, Config, DatabaseConfig, HandlerCommand, LoggingConfig, PolicyEntry,
    ReportsConfig,
};
pub use event::{FailureEvent, FailureReport, LockRecord};
pub use outcome::{ExecutionOutcome, OutcomeStatus, OutputFormat, RunMode, RunSummary, SkipReason};
