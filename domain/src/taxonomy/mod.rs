//! Taxonomy domain
//!
//! Ranks, the nested taxon tree, and the builder that turns flat species
//! records into that tree.

mod builder;
mod node;
mod rank;

pub use builder::{Hierarchy, HierarchyBuilder, SpeciesRecord, build_hierarchy, is_blank_taxon};
pub use node::{
    DIET_KEY, ECOLOGY_KEY, SPEC_CODE_KEY, TaxonNode, UNKNOWN_SPEC_CODE, is_marker_key,
    spec_code_to_string,
};
pub use rank::Rank;
