//! Classification configuration from TOML (`[classification]` section)

use ecogroup_application::ClassificationParams;
use ecogroup_domain::{ConfigIssue, ConfigIssueCode, Severity, TemplateSource};
use serde::{Deserialize, Serialize};

/// Raw classification configuration from TOML
///
/// # Example
///
/// ```toml
/// [classification]
/// chunk_size = 5
/// max_concurrent_calls = 4
/// force_grouping = false
/// research_focus = "Fisheries impacts on demersal food webs"
/// template = "default"                     # default, upload, ecobase, geojson
/// template_path = "03_grouping_template.json"
/// proposals = 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClassificationConfig {
    pub chunk_size: usize,
    pub max_concurrent_calls: usize,
    pub force_grouping: bool,
    pub research_focus: Option<String>,
    pub template: String,
    /// Default template file
    pub template_path: String,
    /// File used when `template = "upload"`
    pub upload_path: Option<String>,
    /// Parallel group proposals for GeoJSON template synthesis
    pub proposals: usize,
}

impl Default for FileClassificationConfig {
    fn default() -> Self {
        let params = ClassificationParams::default();
        Self {
            chunk_size: params.chunk_size,
            max_concurrent_calls: params.max_concurrent_calls,
            force_grouping: params.force_grouping,
            research_focus: None,
            template: TemplateSource::default().to_string(),
            template_path: "03_grouping_template.json".to_string(),
            upload_path: None,
            proposals: 3,
        }
    }
}

impl FileClassificationConfig {
    pub fn parse_template(&self) -> (TemplateSource, Vec<ConfigIssue>) {
        match self.template.parse::<TemplateSource>() {
            Ok(source) => (source, vec![]),
            Err(_) => {
                let issue = ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "classification.template".to_string(),
                        value: self.template.clone(),
                        valid_values: TemplateSource::names().map(String::from).to_vec(),
                    },
                    message: format!(
                        "classification.template: unknown value '{}', falling back to 'default'",
                        self.template
                    ),
                };
                (TemplateSource::default(), vec![issue])
            }
        }
    }

    pub fn to_params(&self) -> ClassificationParams {
        ClassificationParams::default()
            .with_chunk_size(self.chunk_size)
            .with_max_concurrent_calls(self.max_concurrent_calls)
            .with_force_grouping(self.force_grouping)
            .with_research_focus(
                self.research_focus
                    .clone()
                    .filter(|f| !f.trim().is_empty()),
            )
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_template().1;
        for (field, value) in [
            ("chunk_size", self.chunk_size),
            ("max_concurrent_calls", self.max_concurrent_calls),
            ("proposals", self.proposals),
        ] {
            if value == 0 {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::OutOfRange {
                        field: format!("classification.{}", field),
                    },
                    message: format!("classification.{}: 0 is treated as 1", field),
                });
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_template_falls_back() {
        let config = FileClassificationConfig {
            template: "wikipedia".to_string(),
            ..Default::default()
        };
        let (source, issues) = config.parse_template();
        assert_eq!(source, TemplateSource::Default);
        assert!(matches!(
            issues[0].code,
            ConfigIssueCode::InvalidEnumValue { .. }
        ));
    }

    #[test]
    fn test_blank_research_focus_dropped() {
        let config = FileClassificationConfig {
            research_focus: Some("  ".to_string()),
            force_grouping: true,
            ..Default::default()
        };
        let params = config.to_params();
        assert!(params.research_focus.is_none());
        assert!(params.force_grouping);
    }

    #[test]
    fn test_zero_chunk_size_warns() {
        let config = FileClassificationConfig {
            chunk_size: 0,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
