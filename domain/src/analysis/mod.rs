//! Consistency analysis domain
//!
//! Statistics comparing the outputs of repeated classification runs:
//! species consistency, group stability, and diet interaction stability.

mod consistency;
mod diet;
mod report;
pub mod stats;

pub use consistency::{
    ConsistencyAnalysis, ConsistencyRecord, GroupStabilityRecord, IterationAssignments, jaccard,
};
pub use diet::{
    DIET_MATRIX_ORIENTATION, DietMatrix, InteractionAnalysis, InteractionStabilityRecord,
    stability_score,
};
pub use report::{
    AnalysisThresholds, IncompleteIteration, RegionAnalysis, RegionSummary, ValidationReport,
};
