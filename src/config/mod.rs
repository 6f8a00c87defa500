//! Configuration management for quickshare
//!
//! Settings are layered, lowest priority first:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use quickshare::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Default provider: {}", config.default_provider);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `QUICKSHARE__<section>__<key>`:
//! - `QUICKSHARE__DEFAULT_PROVIDER=tmpfiles`
//! - `QUICKSHARE__HTTP__REQUEST_TIMEOUT_SECS=120`
//! - `QUICKSHARE__PROVIDERS__FILE_IO__EXPIRES=1d`
//!
//! # Configuration File
//!
//! By default the file is read from `config/quickshare.toml`. The
//! `QUICKSHARE_CONFIG` environment variable or `--config` selects another one.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{
    BundleConfig, Config, FileIoConfig, GofileConfig, HttpSettings, ProvidersConfig,
    TmpfilesConfig, TransferShConfig, retention_window,
};
pub use sources::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
pub use validation::ValidationError;
pub(crate) use validation::validate_url;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load configuration, preferring `path` over `QUICKSHARE_CONFIG` and the default path
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
