//! Configuration loading for ecogroup
//!
//! Handles file discovery, merging and per-run overrides.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./ecogroup.toml` or `./.ecogroup.toml`
//! 3. Global: `$XDG_CONFIG_HOME/ecogroup/config.toml`
//! 4. `ECOGROUP_` environment variables
//! 5. Default values
//!
//! `ai_config.json` in a run directory is applied on top for that run.

mod file_config;
mod loader;
mod run_settings;

pub use file_config::{
    FileAnalysisConfig, FileClassificationConfig, FileConfig, FileOracleConfig, FileOutputConfig,
    FileRetryConfig, FileValidationConfig,
};
pub use loader::ConfigLoader;
pub use run_settings::{GroupingTemplateSetting, RunSettings};
