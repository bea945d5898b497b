//! CLI layer: argument parsing, command execution, and error display.

pub mod commands;
pub mod types;

pub use types::{Cli, Commands, LockCommands, RunArgs};

/// Print a fatal error in the selected output format.
pub fn handle_error(err: &anyhow::Error, json: bool) {
    if json {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
    } else {
        eprintln!("error: {err:#}");
    }
}
