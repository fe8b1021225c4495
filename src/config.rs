//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, an
//! explicit `--config` file, then `BORG_NCDU__*` environment variables.
//! Command line flags are applied on top by the binary.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::{Limits, RootPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge;
mod sources;

pub use sources::environment::ENV_PREFIX;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorgNcduConfig {
    /// Keep all datasets nested under their shared path prefix
    #[serde(default)]
    pub merge_datasets: bool,

    /// borg executable used to list archives
    #[serde(default = "default_borg_command")]
    pub borg_command: String,

    /// ncdu executable used by `--open`
    #[serde(default = "default_ncdu_command")]
    pub ncdu_command: String,

    /// Records between progress log events (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Pretty-print the exported document
    #[serde(default)]
    pub pretty: bool,

    /// Tree construction limits
    #[serde(default)]
    pub limits: Limits,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_borg_command() -> String {
    "borg".to_string()
}

fn default_ncdu_command() -> String {
    "ncdu".to_string()
}

fn default_progress_interval() -> u64 {
    crate::analyzer::DEFAULT_PROGRESS_INTERVAL
}

impl Default for BorgNcduConfig {
    fn default() -> Self {
        Self {
            merge_datasets: false,
            borg_command: default_borg_command(),
            ncdu_command: default_ncdu_command(),
            progress_interval: default_progress_interval(),
            pretty: false,
            limits: Limits::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BorgNcduConfig {
    pub fn root_policy(&self) -> RootPolicy {
        RootPolicy::from_merge_flag(self.merge_datasets)
    }

    /// Render as TOML, in the layout the config files use
    pub fn to_toml(&self) -> Result<String, ApiError> {
        toml::to_string_pretty(self).map_err(|e| {
            ApiError::ConfigError(format!("Failed to serialize configuration: {}", e))
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.borg_command.trim().is_empty() {
            errors.push("borg_command cannot be empty".to_string());
        }
        if self.ncdu_command.trim().is_empty() {
            errors.push("ncdu_command cannot be empty".to_string());
        }
        if self.limits.max_depth == 0 {
            errors.push("limits.max_depth must be at least 1".to_string());
        }
        if self.limits.max_nodes == Some(0) {
            errors.push("limits.max_nodes must be at least 1".to_string());
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("logging: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`BorgNcduConfig`] from all sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path of the global config file, if a home directory is known
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    /// Load defaults, global file, optional explicit file and environment.
    pub fn load(explicit: Option<&Path>) -> Result<BorgNcduConfig, ApiError> {
        let mut builder = merge::merge_policy::builder_with_defaults()?;
        builder = sources::global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = sources::explicit_file::add_to_builder(builder, path)?;
        }
        builder = sources::environment::add_to_builder(builder);

        let config: BorgNcduConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load a single file on top of the defaults, ignoring other sources.
    pub fn load_from_file(path: &Path) -> Result<BorgNcduConfig, ApiError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::explicit_file::add_to_builder(builder, path)?;
        let config: BorgNcduConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    fn validated(config: BorgNcduConfig) -> Result<BorgNcduConfig, ApiError> {
        config.validate().map_err(|errors| {
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }
}
