//! The `init` command: write a default project configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::domain::models::Config;

/// Create `.remedy/` with a default `config.yaml` plus the reports and
/// handlers directories the defaults point at.
pub async fn execute(force: bool, json: bool) -> Result<i32> {
    let config_dir = Path::new(".remedy");
    let config_path = config_dir.join("config.yaml");

    if config_path.exists() && !force {
        bail!(
            "already initialized: {} exists (use --force to overwrite)",
            config_path.display()
        );
    }

    tokio::fs::create_dir_all(config_dir.join("reports"))
        .await
        .context("failed to create reports directory")?;
    tokio::fs::create_dir_all(config_dir.join("handlers"))
        .await
        .context("failed to create handlers directory")?;

    let yaml =
        serde_yaml::to_string(&Config::default()).context("failed to serialize default config")?;
    tokio::fs::write(&config_path, yaml)
        .await
        .context("failed to write config file")?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "initialized": true, "config": config_path.display().to_string() })
        );
    } else {
        println!("Initialized remedy configuration at {}", config_path.display());
        println!("Drop failure reports into .remedy/reports/ and run `remedy run`.");
    }

    Ok(0)
}
