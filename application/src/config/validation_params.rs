//! Validation parameters: batch size and worker pool.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls a validation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationParams {
    pub n_iterations: usize,
    /// Worker processes running at once.
    pub n_workers: usize,
    /// Wall-clock limit per iteration.
    pub timeout: Duration,
}

impl Default for ValidationParams {
    fn default() -> Self {
        Self {
            n_iterations: 10,
            n_workers: 4,
            timeout: Duration::from_secs(3600),
        }
    }
}

impl ValidationParams {
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    pub fn with_workers(mut self, n: usize) -> Self {
        self.n_workers = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
