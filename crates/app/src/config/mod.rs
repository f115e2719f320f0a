//! Client configuration module

use clap::Args;
use thiserror::Error;

use crate::config::{api::ApiConfig, logging::LoggingConfig, storage::StorageConfig};

pub mod api;
pub mod logging;
pub mod storage;

/// Configuration errors not caught by argument parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API URL isn't an absolute HTTP(S) URL.
    #[error("invalid API URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

/// Rouge client configuration
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Remote cart service settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Guest cart storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Check values clap can't check on its own.
    ///
    /// # Errors
    ///
    /// Returns an error when the API URL is not an absolute `http` or `https` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()
    }
}
