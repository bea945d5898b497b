use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the remediation dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Maximum handler invocations per run (1-100)
    #[serde(default = "default_max_actions")]
    pub max_actions: usize,

    /// Minimum seconds between successful remediations of one failure type
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: i64,

    /// Substring patterns naming pipelines the dispatcher must never act on
    #[serde(default = "default_protected_patterns")]
    pub protected_patterns: Vec<String>,

    /// Static failure-type to handler mappings
    #[serde(default = "default_policies")]
    pub policies: Vec<PolicyEntry>,

    /// Handler executables, keyed by handler id
    #[serde(default = "default_handlers")]
    pub handlers: BTreeMap<String, HandlerCommand>,

    /// Failure report discovery configuration
    #[serde(default)]
    pub reports: ReportsConfig,

    /// Lock store database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Audit log configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_max_actions() -> usize {
    10
}

const fn default_cooldown_seconds() -> i64 {
    900
}

fn default_protected_patterns() -> Vec<String> {
    [
        "production-deploy",
        "security-scan",
        "release-pipeline",
        "master-build",
        "hotfix-deploy",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_policies() -> Vec<PolicyEntry> {
    vec![
        PolicyEntry::new("network_error", "clear_cache_handler"),
        PolicyEntry::new("test_timeout", "rerun_tests_handler"),
        PolicyEntry::new("worker_oom", "restart_worker_handler"),
        PolicyEntry::new("disk_full", "prune_artifacts_handler"),
    ]
}

fn default_handlers() -> BTreeMap<String, HandlerCommand> {
    [
        ("clear_cache_handler", ".remedy/handlers/clear_cache.sh"),
        ("rerun_tests_handler", ".remedy/handlers/rerun_tests.sh"),
        ("restart_worker_handler", ".remedy/handlers/restart_worker.sh"),
        ("prune_artifacts_handler", ".remedy/handlers/prune_artifacts.sh"),
    ]
    .into_iter()
    .map(|(id, command)| (id.to_string(), HandlerCommand::new(command)))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_actions: default_max_actions(),
            cooldown_seconds: default_cooldown_seconds(),
            protected_patterns: default_protected_patterns(),
            policies: default_policies(),
            handlers: default_handlers(),
            reports: ReportsConfig::default(),
            database: DatabaseConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// One static failure-type to handler mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PolicyEntry {
    /// Failure classification this entry applies to
    pub failure_type: String,

    /// Handler invoked for that classification
    pub handler_id: String,
}

impl PolicyEntry {
    /// Build an entry from string-likes.
    pub fn new(failure_type: impl Into<String>, handler_id: impl Into<String>) -> Self {
        Self {
            failure_type: failure_type.into(),
            handler_id: handler_id.into(),
        }
    }
}

/// External executable backing one handler id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HandlerCommand {
    /// Path or name of the executable
    pub command: String,

    /// Fixed arguments passed before the event payload
    #[serde(default)]
    pub args: Vec<String>,

    /// Bounded execution timeout in seconds
    #[serde(default = "default_handler_timeout")]
    pub timeout_seconds: u64,
}

const fn default_handler_timeout() -> u64 {
    120
}

impl HandlerCommand {
    /// Build a handler command with default timeout and no fixed args.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout_seconds: default_handler_timeout(),
        }
    }
}

/// Failure report discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportsConfig {
    /// Directory scanned for the most recently modified `*.json` report
    #[serde(default = "default_reports_dir")]
    pub dir: String,
}

fn default_reports_dir() -> String {
    ".remedy/reports".to_string()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_reports_dir(),
        }
    }
}

/// Lock store database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` lock database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".remedy/remedy.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditConfig {
    /// Path of the append-only JSON-lines audit log
    #[serde(default = "default_audit_path")]
    pub path: String,
}

fn default_audit_path() -> String {
    ".remedy/audit.log".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
