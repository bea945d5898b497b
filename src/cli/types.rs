//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "remedy")]
#[command(about = "CI failure auto-remediation dispatcher", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dispatcher over a failure report (simulates by default)
    Run(RunArgs),

    /// Inspect or reset cooldown locks
    #[command(subcommand)]
    Locks(LockCommands),

    /// Initialize remedy configuration
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Execute remediation handlers for real (default is a dry run)
    #[arg(long)]
    pub apply: bool,

    /// Path to the failure report (defaults to the newest report in the
    /// configured reports directory)
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Override the maximum number of handler invocations for this run
    #[arg(long)]
    pub max_actions: Option<usize>,
}

#[derive(Subcommand)]
pub enum LockCommands {
    /// List recorded cooldown locks
    List,

    /// Clear the lock for a failure type
    Clear {
        /// Failure type whose lock should be removed
        failure_type: String,
    },
}
