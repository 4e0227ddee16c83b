//! Analysis configuration from TOML (`[analysis]` section)

use ecogroup_domain::{AnalysisThresholds, ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalysisConfig {
    /// Species below this consistency score are reported
    pub low_consistency_threshold: f64,
    /// Interactions below this stability score are reported
    pub unstable_interaction_threshold: f64,
}

impl Default for FileAnalysisConfig {
    fn default() -> Self {
        let thresholds = AnalysisThresholds::default();
        Self {
            low_consistency_threshold: thresholds.low_consistency,
            unstable_interaction_threshold: thresholds.unstable_interaction,
        }
    }
}

impl FileAnalysisConfig {
    pub fn to_thresholds(&self) -> (AnalysisThresholds, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut check = |field: &str, value: f64| -> f64 {
            if (0.0..=1.0).contains(&value) {
                return value;
            }
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: format!("analysis.{}", field),
                },
                message: format!("analysis.{}: {} clamped to 0.0..=1.0", field, value),
            });
            value.clamp(0.0, 1.0)
        };

        let thresholds = AnalysisThresholds {
            low_consistency: check("low_consistency_threshold", self.low_consistency_threshold),
            unstable_interaction: check(
                "unstable_interaction_threshold",
                self.unstable_interaction_threshold,
            ),
        };
        (thresholds, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_is_clamped() {
        let config = FileAnalysisConfig {
            low_consistency_threshold: 1.5,
            ..Default::default()
        };
        let (thresholds, issues) = config.to_thresholds();
        assert_eq!(thresholds.low_consistency, 1.0);
        assert_eq!(thresholds.unstable_interaction, 0.7);
        assert_eq!(issues.len(), 1);
    }
}
