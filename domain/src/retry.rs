//! Retry policy for oracle calls
//!
//! Exponential backoff with multiplicative jitter:
//! `delay(n) = min(base * factor^n, max) * (1 ± jitter)`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Substrings marking an error message as transient.
const TRANSIENT_MARKERS: &[&str] = &[
    "rate limit",
    "timeout",
    "timed out",
    "internal server",
    "server error",
    "too many requests",
    "429",
    "500",
    "502",
    "503",
    "504",
    "connection",
    "network",
    "unavailable",
    "capacity",
    "overloaded",
    "throttl",
    "exhausted",
    "quota",
];

/// Whether an error message looks like a transient failure.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    /// Relative jitter, e.g. `0.1` for ±10 %.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(1),
            factor: 2.0,
            max_delay: Duration::from_secs(300),
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Whether another attempt is allowed after `attempt` (0-based) failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// `sample` is a uniform draw from `[-1.0, 1.0]` scaling the jitter;
    /// pass `0.0` for the undisturbed delay.
    pub fn delay_for(&self, attempt: u32, sample: f64) -> Duration {
        let exp = self.factor.max(1.0).powi(attempt.min(64) as i32);
        let raw = self.base_delay.as_secs_f64() * exp;
        let capped = raw.min(self.max_delay.as_secs_f64());
        let jitter = self.jitter.clamp(0.0, 1.0) * sample.clamp(-1.0, 1.0);
        Duration::from_secs_f64((capped * (1.0 + jitter)).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_messages() {
        assert!(is_transient_message("HTTP 429 Too Many Requests"));
        assert!(is_transient_message("Rate limit exceeded"));
        assert!(is_transient_message("Model is overloaded"));
        assert!(is_transient_message("request timed out"));
        assert!(!is_transient_message("invalid api key"));
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0, 0.0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3, 0.0), Duration::from_secs(8));
        assert_eq!(policy.delay_for(20, 0.0), Duration::from_secs(300));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::default();
        let low = policy.delay_for(2, -1.0).as_secs_f64();
        let high = policy.delay_for(2, 1.0).as_secs_f64();
        assert!((low - 3.6).abs() < 1e-9);
        assert!((high - 4.4).abs() < 1e-9);
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(6));
        assert!(!policy.should_retry(7));
        assert!(!RetryPolicy::none().should_retry(0));
    }
}
