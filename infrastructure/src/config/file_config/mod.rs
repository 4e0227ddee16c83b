//! Raw TOML configuration data types
//!
//! These structs mirror the config file. Each section converts itself into
//! the application or domain type it configures and reports what it had to
//! correct as [`ConfigIssue`]s.

mod analysis;
mod classification;
mod oracle;
mod output;
mod retry;
mod validation;

pub use analysis::FileAnalysisConfig;
pub use classification::FileClassificationConfig;
pub use oracle::FileOracleConfig;
pub use output::FileOutputConfig;
pub use retry::FileRetryConfig;
pub use validation::FileValidationConfig;

use ecogroup_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub oracle: FileOracleConfig,
    pub retry: FileRetryConfig,
    pub classification: FileClassificationConfig,
    pub validation: FileValidationConfig,
    pub analysis: FileAnalysisConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.oracle.validate();
        issues.extend(self.retry.to_policy().1);
        issues.extend(self.classification.validate());
        issues.extend(self.validation.validate());
        issues.extend(self.analysis.to_thresholds().1);
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecogroup_domain::{OutputFormat, Severity, TemplateSource};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[oracle]
model = "llama3"
endpoint = "https://llm.example.org/v1"
temperature = 0.2

[retry]
max_attempts = 4

[classification]
chunk_size = 10
force_grouping = true
template = "geojson"

[validation]
iterations = 20
workers = 8
command = "ecogroup-dev classify"

[analysis]
unstable_interaction_threshold = 0.6

[output]
format = "json"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.oracle.endpoint, "https://llm.example.org/v1");
        assert_eq!(config.oracle.api_key_env, "ECOGROUP_API_KEY");
        assert_eq!(config.retry.to_policy().0.max_attempts, 4);
        assert_eq!(config.classification.chunk_size, 10);
        assert_eq!(
            config.classification.parse_template().0,
            TemplateSource::Geojson
        );
        assert_eq!(config.validation.to_params().n_workers, 8);
        assert_eq!(config.validation.timeout_secs, 3600);
        assert_eq!(config.analysis.to_thresholds().0.unstable_interaction, 0.6);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let mut config = FileConfig::default();
        config.classification.template = "ecopath".to_string();
        config.validation.workers = 0;
        config.validation.timeout_secs = 0;

        let issues = config.validate();

        assert_eq!(issues.len(), 3);
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::Error && i.message.contains("timeout_secs"))
        );
    }
}
