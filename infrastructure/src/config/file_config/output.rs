//! Output configuration from TOML (`[output]` section)

use ecogroup_domain::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Report format when `--format` is not given
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress bars
    pub progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            progress: true,
        }
    }
}
