//! Classification parameters: engine batching and grouping policy.

use serde::{Deserialize, Serialize};

/// Controls how the classification engine batches oracle calls and treats
/// novel groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationParams {
    /// Sibling taxa per oracle call.
    pub chunk_size: usize,
    /// Oracle calls in flight at once within one rank.
    pub max_concurrent_calls: usize,
    /// Keep the registry fixed and divert novel groups to the extra store.
    pub force_grouping: bool,
    /// Research focus forwarded to the oracle.
    pub research_focus: Option<String>,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            max_concurrent_calls: 4,
            force_grouping: false,
            research_focus: None,
        }
    }
}

impl ClassificationParams {
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_max_concurrent_calls(mut self, max: usize) -> Self {
        self.max_concurrent_calls = max;
        self
    }

    pub fn with_force_grouping(mut self, force: bool) -> Self {
        self.force_grouping = force;
        self
    }

    pub fn with_research_focus(mut self, focus: Option<String>) -> Self {
        self.research_focus = focus;
        self
    }

    /// Chunk size clamped to at least one.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Concurrency clamped to at least one.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrent_calls.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ClassificationParams::default();
        assert_eq!(params.chunk_size, 5);
        assert!(!params.force_grouping);
        assert!(params.research_focus.is_none());
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let params = ClassificationParams::default()
            .with_chunk_size(0)
            .with_max_concurrent_calls(0);
        assert_eq!(params.effective_chunk_size(), 1);
        assert_eq!(params.effective_concurrency(), 1);
    }
}
