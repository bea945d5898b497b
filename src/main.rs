//! Remedy CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use remedy::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Run(args) => remedy::cli::commands::run::execute(args, cli.json).await,
        Commands::Locks(command) => remedy::cli::commands::locks::execute(command, cli.json).await,
        Commands::Init { force } => remedy::cli::commands::init::execute(force, cli.json).await,
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            remedy::cli::handle_error(&err, cli.json);
            std::process::exit(2);
        }
    }
}
