use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_actions: {0}. Must be between 1 and 100")]
    InvalidMaxActions(usize),

    #[error("Invalid cooldown_seconds: {0}. Must not be negative")]
    InvalidCooldown(i64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .remedy/config.yaml (project config, created by init)
    /// 3. .remedy/local.yaml (project local overrides, optional)
    /// 4. Environment variables (REMEDY_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.remedy/) so several
    /// products can run their own dispatcher from one machine.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".remedy/config.yaml"))
            .merge(Yaml::file(".remedy/local.yaml"))
            .merge(Env::prefixed("REMEDY_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_actions == 0 || config.max_actions > 100 {
            return Err(ConfigError::InvalidMaxActions(config.max_actions));
        }

        if config.cooldown_seconds < 0 {
            return Err(ConfigError::InvalidCooldown(config.cooldown_seconds));
        }

        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        for entry in &config.policies {
            if entry.failure_type.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "policy failure_type cannot be empty".to_string(),
                ));
            }
            if entry.handler_id.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "policy for '{}' has an empty handler_id",
                    entry.failure_type
                )));
            }
        }

        for (handler_id, handler) in &config.handlers {
            if handler.command.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "handler '{handler_id}' command cannot be empty"
                )));
            }
            if handler.timeout_seconds == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "handler '{handler_id}' timeout_seconds cannot be 0"
                )));
            }
        }

        Ok(())
    }
}
