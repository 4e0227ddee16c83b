//! Per-region validation report model

use super::consistency::ConsistencyAnalysis;
use super::diet::InteractionAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cut-offs used to flag unstable species and interactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisThresholds {
    pub low_consistency: f64,
    pub unstable_interaction: f64,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            low_consistency: 0.95,
            unstable_interaction: 0.7,
        }
    }
}

/// An iteration directory missing one or more outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteIteration {
    pub name: String,
    pub missing: Vec<String>,
}

/// Headline numbers for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionSummary {
    pub total_groups: usize,
    pub species_analyzed: usize,
    pub mean_consistency: f64,
    pub median_consistency: f64,
    pub group_count_distribution: BTreeMap<usize, usize>,
    pub unstable_species: Vec<String>,
    pub total_interactions: usize,
    pub unstable_interactions: usize,
}

/// Everything computed for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAnalysis {
    pub name: String,
    pub group_iterations: Vec<String>,
    pub matrix_iterations: Vec<String>,
    pub incomplete: Vec<IncompleteIteration>,
    pub thresholds: AnalysisThresholds,
    pub summary: RegionSummary,
    pub consistency: ConsistencyAnalysis,
    pub interactions: Option<InteractionAnalysis>,
}

impl RegionAnalysis {
    pub fn new(
        name: impl Into<String>,
        consistency: ConsistencyAnalysis,
        interactions: Option<InteractionAnalysis>,
        thresholds: AnalysisThresholds,
    ) -> Self {
        let summary = RegionSummary {
            total_groups: consistency.groups.len(),
            species_analyzed: consistency.species.len(),
            mean_consistency: consistency.mean_consistency(),
            median_consistency: consistency.median_consistency(),
            group_count_distribution: consistency.group_count_distribution(),
            unstable_species: consistency
                .unstable_species(thresholds.low_consistency)
                .into_iter()
                .map(|r| r.species.clone())
                .collect(),
            total_interactions: interactions
                .as_ref()
                .map_or(0, |i| i.interactions.len()),
            unstable_interactions: interactions
                .as_ref()
                .map_or(0, |i| i.unstable(thresholds.unstable_interaction).len()),
        };

        Self {
            name: name.into(),
            group_iterations: Vec::new(),
            matrix_iterations: Vec::new(),
            incomplete: Vec::new(),
            thresholds,
            summary,
            consistency,
            interactions,
        }
    }

    pub fn with_iterations(mut self, groups: Vec<String>, matrices: Vec<String>) -> Self {
        self.group_iterations = groups;
        self.matrix_iterations = matrices;
        self
    }

    pub fn with_incomplete(mut self, incomplete: Vec<IncompleteIteration>) -> Self {
        self.incomplete = incomplete;
        self
    }
}

/// Report over every analysed region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub generated_at: String,
    pub regions: Vec<RegionAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::IterationAssignments;

    #[test]
    fn test_summary_counts_unstable_species() {
        let its: Vec<IterationAssignments> = vec![
            [("A", "Fish"), ("B", "Fish")]
                .into_iter()
                .map(|(s, g)| (s.to_string(), g.to_string()))
                .collect(),
            [("A", "Fish"), ("B", "Invert")]
                .into_iter()
                .map(|(s, g)| (s.to_string(), g.to_string()))
                .collect(),
        ];
        let region = RegionAnalysis::new(
            "north_sea",
            ConsistencyAnalysis::compute(&its),
            None,
            AnalysisThresholds::default(),
        );
        assert_eq!(region.summary.species_analyzed, 2);
        assert_eq!(region.summary.total_groups, 1);
        assert_eq!(region.summary.unstable_species, vec!["B".to_string()]);
        assert_eq!(region.summary.total_interactions, 0);
    }

    #[test]
    fn test_default_thresholds() {
        let thresholds = AnalysisThresholds::default();
        assert_eq!(thresholds.low_consistency, 0.95);
        assert_eq!(thresholds.unstable_interaction, 0.7);
    }
}
