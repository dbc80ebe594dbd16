//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod jobs;
pub mod logging;
pub mod server;
pub mod storage;
pub mod tools;

use serde::{Deserialize, Serialize};

use self::jobs::JobsConfig;
use self::logging::LoggingConfig;
use self::server::ServerConfig;
use self::storage::StorageConfig;
use self::tools::ToolsConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Job admission and execution settings.
    #[serde(default)]
    pub jobs: JobsConfig,
    /// Working-storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// External converter tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCPRESS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCPRESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate cross-section invariants.
    ///
    /// The artifact retention window must exceed the maximum possible job
    /// lifetime (queue wait plus the largest execution ceiling), otherwise
    /// the reaper could delete files a running job still needs.
    pub fn validate(&self) -> Result<(), AppError> {
        let max_job_lifetime = self.jobs.queue_wait_seconds
            + self
                .jobs
                .execution_timeout_seconds
                .max(self.jobs.office_timeout_seconds);

        if self.storage.retention_seconds <= max_job_lifetime {
            return Err(AppError::configuration(format!(
                "storage.retention_seconds ({}) must exceed the maximum job lifetime ({}s = queue wait + execution ceiling)",
                self.storage.retention_seconds, max_job_lifetime
            )));
        }

        if self.jobs.max_concurrent == 0 {
            return Err(AppError::configuration(
                "jobs.max_concurrent must be at least 1",
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            jobs: JobsConfig::default(),
            storage: StorageConfig::default(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
