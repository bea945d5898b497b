//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber, plus the
//! durable JSON-lines audit trail.

pub mod audit;

pub use audit::{AuditAction, AuditLogger, AuditRecord, AuditSeverity};
