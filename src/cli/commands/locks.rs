//! The `locks` command: operator inspection and reset of cooldown locks.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use uuid::Uuid;

use crate::cli::types::LockCommands;
use crate::domain::models::LockRecord;
use crate::domain::ports::LockStore;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::database::SqliteLockStore;
use crate::infrastructure::logging::audit::{
    AuditAction, AuditLogger, AuditRecord, AuditSeverity,
};

/// Execute a locks subcommand against the configured store.
///
/// Unlike a dispatch run, inspection has no fail-open path: an unreachable
/// store is a hard error here.
pub async fn execute(command: LockCommands, json: bool) -> Result<i32> {
    let config = ConfigLoader::load()?;
    let store = SqliteLockStore::connect(
        Path::new(&config.database.path),
        config.database.max_connections,
    )
    .await
    .context("failed to open lock store")?;

    match command {
        LockCommands::List => {
            let records = store.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", render_lock_table(&records));
            }
        }
        LockCommands::Clear { failure_type } => {
            let removed = store.clear(&failure_type).await?;

            let audit = AuditLogger::new(&config.audit.path)
                .await
                .context("failed to open audit log")?;
            audit
                .record(
                    AuditRecord::new(Uuid::new_v4(), AuditAction::LockCleared, AuditSeverity::Info)
                        .with_detail(format!("failure_type={failure_type} removed={removed}")),
                )
                .await?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({ "failure_type": failure_type, "removed": removed })
                );
            } else if removed {
                println!("Cleared lock for '{failure_type}'.");
            } else {
                println!("No lock recorded for '{failure_type}'.");
            }
        }
    }

    Ok(0)
}

fn render_lock_table(records: &[LockRecord]) -> String {
    if records.is_empty() {
        return "No cooldown locks recorded.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["FAILURE TYPE", "LAST SUCCESS", "EPOCH"]
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );
    for record in records {
        let last_run = record
            .last_run_at()
            .map_or_else(|| "-".to_string(), |ts| ts.to_rfc3339());
        table.add_row(vec![
            Cell::new(&record.failure_type),
            Cell::new(last_run),
            Cell::new(record.last_run_epoch_seconds),
        ]);
    }
    format!("{} lock(s):\n{table}", records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty_locks() {
        assert_eq!(render_lock_table(&[]), "No cooldown locks recorded.");
    }

    #[test]
    fn test_render_lock_rows() {
        let records = vec![LockRecord {
            failure_type: "network_error".to_string(),
            last_run_epoch_seconds: 1_700_000_000,
        }];
        let rendered = render_lock_table(&records);
        assert!(rendered.contains("network_error"));
        assert!(rendered.contains("1700000000"));
        assert!(rendered.starts_with("1 lock(s):"));
    }
}
