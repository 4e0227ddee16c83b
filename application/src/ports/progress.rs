//! Progress notification ports
//!
//! Callbacks fired by the classification engine and the validation
//! orchestrator. Implementations live in the presentation layer (progress
//! bars) and the infrastructure layer (the grouping report).

use ecogroup_domain::Rank;

/// Callback for progress updates during classification
pub trait ClassificationProgress: Send + Sync {
    /// Called when a rank starts with the taxa awaiting a verdict
    fn on_rank_start(&self, rank: Rank, taxa: usize, chunks: usize);

    /// Called when one oracle chunk finishes
    fn on_chunk_complete(&self, rank: Rank, taxa: usize, success: bool);

    /// Called when a rank has been applied and checkpointed
    fn on_rank_complete(&self, rank: Rank, assigned: usize, resolved: usize);

    /// Called for every taxon placed into a group
    fn on_assignment(&self, _taxon: &str, _group: &str, _rank: Rank) {}

    /// Called when a novel group is registered
    fn on_new_group(&self, _group: &str, _forced: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ClassificationProgress for NoProgress {
    fn on_rank_start(&self, _rank: Rank, _taxa: usize, _chunks: usize) {}
    fn on_chunk_complete(&self, _rank: Rank, _taxa: usize, _success: bool) {}
    fn on_rank_complete(&self, _rank: Rank, _assigned: usize, _resolved: usize) {}
}

/// Callback for progress updates during a validation batch
pub trait ValidationProgress: Send + Sync {
    fn on_batch_start(&self, iterations: usize, workers: usize);

    fn on_iteration_complete(&self, index: usize, success: bool);

    fn on_batch_complete(&self, _succeeded: usize, _total: usize) {}
}

/// No-op validation progress
pub struct NoValidationProgress;

impl ValidationProgress for NoValidationProgress {
    fn on_batch_start(&self, _iterations: usize, _workers: usize) {}
    fn on_iteration_complete(&self, _index: usize, _success: bool) {}
}
