//! The `run` command: one full dispatch over a failure report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::types::RunArgs;
use crate::domain::models::{OutputFormat, RunMode};
use crate::domain::ports::LockStore;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::database::{SqliteLockStore, UnavailableLockStore};
use crate::infrastructure::logging::audit::AuditLogger;
use crate::infrastructure::process::ProcessInvoker;
use crate::infrastructure::report;
use crate::services::{Dispatcher, GuardChain, PolicyTable};

/// Execute a dispatcher run. Returns the process exit code: `0` when no
/// outcome failed, `1` otherwise. Configuration and report problems bubble
/// up as fatal errors (exit 2) before any dispatch.
pub async fn execute(args: RunArgs, json: bool) -> Result<i32> {
    let config = ConfigLoader::load()?;
    let max_actions = args.max_actions.unwrap_or(config.max_actions);
    let mode = if args.apply {
        RunMode::Apply
    } else {
        RunMode::DryRun
    };

    let report_path: PathBuf = match args.report {
        Some(path) => path,
        None => report::discover_latest(Path::new(&config.reports.dir))?,
    };
    let failure_report = report::load(&report_path)?;
    info!(
        report = %report_path.display(),
        events = failure_report.failures.len(),
        %mode,
        "starting dispatch"
    );

    let audit = AuditLogger::new(&config.audit.path)
        .await
        .context("failed to open audit log")?;

    // A lock store outage degrades dedup; it never blocks the operator.
    let locks: Arc<dyn LockStore> = match SqliteLockStore::connect(
        Path::new(&config.database.path),
        config.database.max_connections,
    )
    .await
    {
        Ok(store) => Arc::new(store),
        Err(err) => {
            warn!(error = %err, "lock store unavailable, proceeding without dedup");
            Arc::new(UnavailableLockStore::new(err.to_string()))
        }
    };

    let invoker = Arc::new(ProcessInvoker::new(config.handlers.clone()));
    let dispatcher = Dispatcher::new(
        PolicyTable::from_entries(&config.policies),
        GuardChain::new(config.protected_patterns.clone(), config.cooldown_seconds),
        locks,
        invoker,
        audit,
        max_actions,
    );

    let summary = dispatcher.run(failure_report.failures, mode).await;

    let format = if json {
        OutputFormat::Structured
    } else {
        OutputFormat::Narrative
    };
    println!("{}", crate::services::reporter::render(&summary, format));

    Ok(summary.exit_code())
}
