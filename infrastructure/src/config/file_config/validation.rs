//! Validation configuration from TOML (`[validation]` section)

use crate::validation::DEFAULT_FATAL_MARKERS;
use ecogroup_application::ValidationParams;
use ecogroup_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw validation configuration from TOML
///
/// # Example
///
/// ```toml
/// [validation]
/// iterations = 10
/// workers = 4
/// timeout_secs = 3600
/// command = "ecogroup classify"            # defaults to this binary
/// required_files = ["02_species_data.json"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileValidationConfig {
    pub iterations: usize,
    pub workers: usize,
    pub timeout_secs: u64,
    pub command: Option<String>,
    pub required_files: Vec<String>,
    pub fatal_markers: Vec<String>,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        let params = ValidationParams::default();
        Self {
            iterations: params.n_iterations,
            workers: params.n_workers,
            timeout_secs: params.timeout.as_secs(),
            command: None,
            required_files: vec![crate::layout::SPECIES_DATA_FILE.to_string()],
            fatal_markers: DEFAULT_FATAL_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl FileValidationConfig {
    pub fn to_params(&self) -> ValidationParams {
        ValidationParams::default()
            .with_iterations(self.iterations)
            .with_workers(self.workers.max(1))
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.workers == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: "validation.workers".to_string(),
                },
                message: "validation.workers: 0 is treated as 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::OutOfRange {
                    field: "validation.timeout_secs".to_string(),
                },
                message: "validation.timeout_secs must be at least 1".to_string(),
            });
        }
        if self
            .command
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyValue {
                    field: "validation.command".to_string(),
                },
                message: "validation.command is set but empty".to_string(),
            });
        }
        issues
    }
}
