//! Domain layer for ecogroup
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Taxonomy
//!
//! Species records are folded into a Kingdom → … → Species tree of
//! [`TaxonNode`]s. A node is a leaf iff it carries a species code.
//!
//! ## Functional groups
//!
//! - **Reference groups**: the [`ReferenceGroupRegistry`] of group names and
//!   descriptions the oracle may assign taxa to
//! - **Assignments**: the [`AssignmentStore`] mapping each group to the
//!   subtrees placed in it, persisted as a resumable [`Checkpoint`]
//!
//! ## Consistency analysis
//!
//! Repeated classification runs are compared per species
//! ([`ConsistencyRecord`]), per group ([`GroupStabilityRecord`]) and per
//! predator-prey interaction ([`InteractionStabilityRecord`]).

pub mod analysis;
pub mod assignment;
pub mod classification;
pub mod config;
pub mod core;
pub mod geo;
pub mod prompt;
pub mod registry;
pub mod retry;
pub mod taxonomy;
pub mod util;
pub mod validation;

// Re-export commonly used types
pub use analysis::{
    AnalysisThresholds, ConsistencyAnalysis, ConsistencyRecord, DietMatrix, GroupStabilityRecord,
    IncompleteIteration, InteractionAnalysis, InteractionStabilityRecord, IterationAssignments,
    RegionAnalysis, RegionSummary, ValidationReport, jaccard, stability_score,
};
pub use assignment::{
    AssignmentStore, Checkpoint, DETRITUS_GROUP, DETRITUS_SPEC_CODE, ProcessedTaxaSet,
};
pub use classification::{ClassificationRequest, ClassificationResponse, RESOLVE, Verdict};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, TemplateSource};
pub use core::{error::DomainError, model::Model};
pub use geo::{AreaDescription, BoundingBox};
pub use prompt::{ClassificationPrompt, TemplatePrompt};
pub use registry::ReferenceGroupRegistry;
pub use retry::{RetryPolicy, is_transient_message};
pub use taxonomy::{Hierarchy, HierarchyBuilder, Rank, SpeciesRecord, TaxonNode, build_hierarchy};
pub use validation::{
    ValidationMetadata, base_name_from_dir, is_iteration_dir, iteration_dir_name, iteration_index,
};
