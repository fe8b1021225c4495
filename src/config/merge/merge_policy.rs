//! Merge rules: defaults, override order, conflict handling.

use crate::analyzer::DEFAULT_PROGRESS_INTERVAL;
use crate::tree::builder::DEFAULT_MAX_DEPTH;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("merge_datasets", false)?
        .set_default("borg_command", "borg")?
        .set_default("ncdu_command", "ncdu")?
        .set_default("progress_interval", DEFAULT_PROGRESS_INTERVAL)?
        .set_default("limits.max_depth", DEFAULT_MAX_DEPTH as u64)
}
