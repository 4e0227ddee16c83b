//! Retry configuration from TOML (`[retry]` section)

use ecogroup_domain::{ConfigIssue, ConfigIssueCode, RetryPolicy, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff for transient oracle failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: f64,
    pub factor: f64,
    pub max_delay_secs: f64,
    pub jitter: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_secs: policy.base_delay.as_secs_f64(),
            factor: policy.factor,
            max_delay_secs: policy.max_delay.as_secs_f64(),
            jitter: policy.jitter,
        }
    }
}

impl FileRetryConfig {
    /// Convert to a policy, clamping unusable values.
    pub fn to_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut out_of_range = |field: &str, message: String| {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: format!("retry.{}", field),
                },
                message,
            });
        };

        if self.max_attempts == 0 {
            out_of_range("max_attempts", "retry.max_attempts: 0 means one attempt".into());
        }
        if self.factor < 1.0 {
            out_of_range("factor", format!("retry.factor: {} raised to 1.0", self.factor));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            out_of_range("jitter", format!("retry.jitter: {} clamped to 0.0..1.0", self.jitter));
        }

        let secs = |s: f64| Duration::from_secs_f64(s.max(0.0));
        let policy = RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: secs(self.base_delay_secs),
            factor: self.factor.max(1.0),
            max_delay: secs(self.max_delay_secs.max(self.base_delay_secs)),
            jitter: self.jitter.clamp(0.0, 0.99),
        };
        (policy, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let (policy, issues) = FileRetryConfig::default().to_policy();
        assert_eq!(policy, RetryPolicy::default());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_clamping() {
        let config = FileRetryConfig {
            max_attempts: 0,
            factor: 0.5,
            jitter: 3.0,
            ..Default::default()
        };
        let (policy, issues) = config.to_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.factor, 1.0);
        assert!(policy.jitter < 1.0);
        assert_eq!(issues.len(), 3);
    }
}
