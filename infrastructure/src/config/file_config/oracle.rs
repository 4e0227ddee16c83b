//! Oracle configuration from TOML (`[oracle]` section)

use ecogroup_domain::{ConfigIssue, ConfigIssueCode, Model, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw oracle configuration from TOML
///
/// # Example
///
/// ```toml
/// [oracle]
/// model = "claude"                         # alias or provider model id
/// endpoint = "http://localhost:4000/v1"    # OpenAI-compatible base URL
/// api_key_env = "ECOGROUP_API_KEY"
/// temperature = 0.0
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    pub model: String,
    pub endpoint: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for FileOracleConfig {
    fn default() -> Self {
        Self {
            model: Model::default().to_string(),
            endpoint: "http://localhost:4000/v1".to_string(),
            api_key_env: "ECOGROUP_API_KEY".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

impl FileOracleConfig {
    pub fn parse_model(&self) -> (Model, Vec<ConfigIssue>) {
        if self.model.trim().is_empty() {
            let issue = ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyValue {
                    field: "oracle.model".to_string(),
                },
                message: format!("oracle.model is empty, using '{}'", Model::default()),
            };
            return (Model::default(), vec![issue]);
        }
        // Unknown names become custom model ids
        let model: Model = self.model.parse().unwrap_or_default();
        (model, vec![])
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_model().1;
        if self.endpoint.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyValue {
                    field: "oracle.endpoint".to_string(),
                },
                message: "oracle.endpoint must name the chat completions base URL".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: "oracle.temperature".to_string(),
                },
                message: format!(
                    "oracle.temperature: {} is outside 0.0..=2.0",
                    self.temperature
                ),
            });
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::OutOfRange {
                    field: "oracle.timeout_secs".to_string(),
                },
                message: "oracle.timeout_secs must be at least 1".to_string(),
            });
        }
        issues
    }
}
