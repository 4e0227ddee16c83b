//! Cross-iteration consistency of species group assignments
//!
//! Each iteration contributes a `species → group` map. From those maps we
//! derive how often each species lands in its modal group and how stable
//! each group's membership is between iterations.

use super::stats::{mean, median, population_std};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One iteration's assignments: species → group.
pub type IterationAssignments = BTreeMap<String, String>;

/// Jaccard similarity of two sets; two empty sets are identical.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Per-species consistency over the iterations it appears in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyRecord {
    pub species: String,
    pub most_common_group: String,
    pub consistency_score: f64,
    /// Distinct groups in first-observed order.
    pub unique_groups: Vec<String>,
    pub group_counts: BTreeMap<String, usize>,
    pub num_different_groups: usize,
    /// Iterations in which the species was assigned at all.
    pub total_iterations: usize,
}

impl ConsistencyRecord {
    /// Build from the labels of one species, in iteration order.
    ///
    /// Returns `None` for an empty label list.
    pub fn from_labels(species: impl Into<String>, labels: &[&str]) -> Option<Self> {
        if labels.is_empty() {
            return None;
        }

        let mut unique_groups: Vec<String> = Vec::new();
        let mut group_counts: BTreeMap<String, usize> = BTreeMap::new();
        for label in labels {
            if !group_counts.contains_key(*label) {
                unique_groups.push(label.to_string());
            }
            *group_counts.entry(label.to_string()).or_insert(0) += 1;
        }

        // First observed group wins ties.
        let mut most_common = &unique_groups[0];
        let mut best = 0;
        for group in &unique_groups {
            let count = group_counts[group];
            if count > best {
                best = count;
                most_common = group;
            }
        }

        Some(Self {
            species: species.into(),
            most_common_group: most_common.clone(),
            consistency_score: best as f64 / labels.len() as f64,
            num_different_groups: unique_groups.len(),
            total_iterations: labels.len(),
            unique_groups,
            group_counts,
        })
    }

    /// `(group, count, percent)` sorted by count, most frequent first.
    pub fn group_frequencies(&self) -> Vec<(&str, usize, f64)> {
        let mut frequencies: Vec<(&str, usize, f64)> = self
            .unique_groups
            .iter()
            .map(|group| {
                let count = self.group_counts.get(group).copied().unwrap_or(0);
                let percent = count as f64 / self.total_iterations as f64 * 100.0;
                (group.as_str(), count, percent)
            })
            .collect();
        frequencies.sort_by(|a, b| b.1.cmp(&a.1));
        frequencies
    }
}

/// Membership stability of one group over the iterations it appears in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStabilityRecord {
    pub group: String,
    pub iterations_present: usize,
    pub avg_jaccard_similarity: f64,
    pub total_unique_members: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub avg_size: f64,
    pub size_std: f64,
}

impl GroupStabilityRecord {
    /// Build from the member sets of one group. Needs at least two sets.
    pub fn from_member_sets(group: impl Into<String>, sets: &[BTreeSet<String>]) -> Option<Self> {
        if sets.len() < 2 {
            return None;
        }

        let mut similarities = Vec::new();
        for (i, a) in sets.iter().enumerate() {
            for b in &sets[i + 1..] {
                similarities.push(jaccard(a, b));
            }
        }

        let sizes: Vec<usize> = sets.iter().map(BTreeSet::len).collect();
        let sizes_f: Vec<f64> = sizes.iter().map(|&s| s as f64).collect();
        let union: BTreeSet<&String> = sets.iter().flatten().collect();

        Some(Self {
            group: group.into(),
            iterations_present: sets.len(),
            avg_jaccard_similarity: mean(&similarities),
            total_unique_members: union.len(),
            min_size: sizes.iter().copied().min().unwrap_or(0),
            max_size: sizes.iter().copied().max().unwrap_or(0),
            avg_size: mean(&sizes_f),
            size_std: population_std(&sizes_f),
        })
    }
}

/// Consistency and stability records for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsistencyAnalysis {
    pub iterations: usize,
    pub species: BTreeMap<String, ConsistencyRecord>,
    pub groups: BTreeMap<String, GroupStabilityRecord>,
}

impl ConsistencyAnalysis {
    /// Analyse a sequence of iterations, in iteration order.
    pub fn compute(iterations: &[IterationAssignments]) -> Self {
        let mut labels: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut member_sets: BTreeMap<&str, Vec<BTreeSet<String>>> = BTreeMap::new();

        for assignments in iterations {
            let mut members: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
            for (species, group) in assignments {
                labels.entry(species).or_default().push(group);
                members.entry(group).or_default().insert(species.clone());
            }
            for (group, set) in members {
                member_sets.entry(group).or_default().push(set);
            }
        }

        let species = labels
            .into_iter()
            .filter_map(|(name, groups)| {
                ConsistencyRecord::from_labels(name, &groups).map(|r| (name.to_string(), r))
            })
            .collect();
        let groups = member_sets
            .into_iter()
            .filter_map(|(name, sets)| {
                GroupStabilityRecord::from_member_sets(name, &sets).map(|r| (name.to_string(), r))
            })
            .collect();

        Self {
            iterations: iterations.len(),
            species,
            groups,
        }
    }

    fn scores(&self) -> Vec<f64> {
        self.species.values().map(|r| r.consistency_score).collect()
    }

    pub fn mean_consistency(&self) -> f64 {
        mean(&self.scores())
    }

    pub fn median_consistency(&self) -> f64 {
        median(&self.scores())
    }

    /// Number of distinct groups → number of species with that many.
    pub fn group_count_distribution(&self) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for record in self.species.values() {
            *distribution.entry(record.num_different_groups).or_insert(0) += 1;
        }
        distribution
    }

    /// Species scoring below `threshold`, least consistent first.
    pub fn unstable_species(&self, threshold: f64) -> Vec<&ConsistencyRecord> {
        let mut unstable: Vec<&ConsistencyRecord> = self
            .species
            .values()
            .filter(|r| r.consistency_score < threshold)
            .collect();
        unstable.sort_by(|a, b| {
            a.consistency_score
                .total_cmp(&b.consistency_score)
                .then_with(|| a.species.cmp(&b.species))
        });
        unstable
    }

    /// Groups whose size varied, largest variation first.
    pub fn groups_by_size_variation(&self) -> Vec<&GroupStabilityRecord> {
        let mut varied: Vec<&GroupStabilityRecord> =
            self.groups.values().filter(|g| g.size_std > 0.0).collect();
        varied.sort_by(|a, b| b.size_std.total_cmp(&a.size_std));
        varied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iteration(pairs: &[(&str, &str)]) -> IterationAssignments {
        pairs
            .iter()
            .map(|(s, g)| (s.to_string(), g.to_string()))
            .collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_jaccard_identity_and_disjoint() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a", "b"])), 1.0);
        assert_eq!(jaccard(&set(&["a"]), &set(&["b"])), 0.0);
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["a"])), 0.5);
    }

    #[test]
    fn test_same_group_everywhere_is_fully_consistent() {
        let its = vec![
            iteration(&[("A", "Fish")]),
            iteration(&[("A", "Fish")]),
            iteration(&[("A", "Fish")]),
        ];
        let analysis = ConsistencyAnalysis::compute(&its);
        assert_eq!(analysis.species["A"].consistency_score, 1.0);
        assert_eq!(analysis.species["A"].total_iterations, 3);
    }

    #[test]
    fn test_two_identical_iterations() {
        let its = vec![
            iteration(&[("A", "Fish"), ("B", "Fish"), ("C", "Invert")]),
            iteration(&[("A", "Fish"), ("B", "Fish"), ("C", "Invert")]),
        ];
        let analysis = ConsistencyAnalysis::compute(&its);

        assert!(analysis.species.values().all(|r| r.consistency_score == 1.0));
        let fish = &analysis.groups["Fish"];
        assert_eq!(fish.avg_jaccard_similarity, 1.0);
        assert_eq!(fish.min_size, 2);
        assert_eq!(fish.max_size, 2);
        assert_eq!(fish.avg_size, 2.0);
        assert_eq!(fish.size_std, 0.0);
        assert!(analysis.groups_by_size_variation().is_empty());
    }

    #[test]
    fn test_species_switching_group() {
        let its = vec![
            iteration(&[("A", "Fish"), ("B", "Fish")]),
            iteration(&[("A", "Fish"), ("B", "Invert")]),
        ];
        let analysis = ConsistencyAnalysis::compute(&its);

        assert_eq!(analysis.species["A"].consistency_score, 1.0);
        let b = &analysis.species["B"];
        assert_eq!(b.consistency_score, 0.5);
        assert_eq!(b.num_different_groups, 2);
        assert_eq!(analysis.groups["Fish"].avg_jaccard_similarity, 0.5);
        assert_eq!(analysis.groups["Fish"].total_unique_members, 2);
        // Invert only appears once
        assert!(!analysis.groups.contains_key("Invert"));

        let unstable = analysis.unstable_species(0.95);
        assert_eq!(unstable.len(), 1);
        assert_eq!(unstable[0].species, "B");
    }

    #[test]
    fn test_tie_break_prefers_first_observed() {
        let record = ConsistencyRecord::from_labels("X", &["Zoo", "Algae"]).unwrap();
        assert_eq!(record.most_common_group, "Zoo");
        assert_eq!(record.consistency_score, 0.5);
        assert_eq!(record.unique_groups, vec!["Zoo", "Algae"]);
    }

    #[test]
    fn test_species_missing_from_iteration_uses_present_count() {
        let its = vec![
            iteration(&[("A", "Fish"), ("B", "Fish")]),
            iteration(&[("A", "Fish")]),
        ];
        let analysis = ConsistencyAnalysis::compute(&its);
        assert_eq!(analysis.species["B"].total_iterations, 1);
        assert_eq!(analysis.species["B"].consistency_score, 1.0);
        let fish = &analysis.groups["Fish"];
        assert_eq!(fish.min_size, 1);
        assert_eq!(fish.max_size, 2);
        assert_eq!(fish.size_std, 0.5);
    }

    #[test]
    fn test_distribution_and_summary() {
        let its = vec![
            iteration(&[("A", "Fish"), ("B", "Fish")]),
            iteration(&[("A", "Fish"), ("B", "Invert")]),
        ];
        let analysis = ConsistencyAnalysis::compute(&its);
        let distribution = analysis.group_count_distribution();
        assert_eq!(distribution[&1], 1);
        assert_eq!(distribution[&2], 1);
        assert_eq!(analysis.mean_consistency(), 0.75);
        assert_eq!(analysis.median_consistency(), 0.75);
    }

    #[test]
    fn test_group_frequencies_sorted() {
        let record = ConsistencyRecord::from_labels("X", &["A", "B", "B", "C"]).unwrap();
        let frequencies = record.group_frequencies();
        assert_eq!(frequencies[0].0, "B");
        assert_eq!(frequencies[0].1, 2);
        assert_eq!(frequencies[0].2, 50.0);
    }
}
