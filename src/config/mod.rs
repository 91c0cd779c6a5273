//! Persistent CLI configuration.
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use ionic_cli::config::ConfigStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env: HashMap<String, String> = std::env::vars().collect();
//! let store = ConfigStore::from_env(&env);
//! store.update(|c| c.cli_flags.enable_telemetry = false).await?;
//! store.save().await?;
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod file;
pub mod store;

pub use env::EnvOverrides;
pub use file::{CliFlags, ConfigFile, DEFAULT_API_URL, Tokens, Urls};
pub use store::ConfigStore;

use thiserror::Error;

/// Failures reading or writing `config.json`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `key` names the file when the whole document is malformed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Could not encode config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file IO failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
