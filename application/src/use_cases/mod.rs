//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_validation;
pub mod classify_species;
pub mod llm_classifier;
pub mod retrying_classifier;
pub mod run_validation;
pub mod synthesize_template;
