//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Post-load validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
