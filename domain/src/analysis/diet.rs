//! Diet matrices and predator-prey interaction stability

use super::stats::mean;
use crate::core::error::DomainError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Top-left header label documenting matrix orientation.
pub const DIET_MATRIX_ORIENTATION: &str = "Prey_rows/Predator_columns";

/// Diet proportions, rows = prey, columns = predators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DietMatrix {
    predators: Vec<String>,
    prey: Vec<String>,
    values: BTreeMap<(String, String), f64>,
}

impl DietMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from CSV-like records.
    ///
    /// The first record is the header (`label, predator, ...`); each
    /// following record is `prey, value, ...`. Empty cells are zero.
    pub fn from_records(records: &[Vec<String>]) -> Result<Self, DomainError> {
        let (header, rows) = records
            .split_first()
            .ok_or_else(|| DomainError::InvalidDietMatrix("empty matrix".to_string()))?;

        let predators: Vec<String> = header.iter().skip(1).map(|s| s.trim().to_string()).collect();
        let mut matrix = DietMatrix::new();

        for (row_idx, row) in rows.iter().enumerate() {
            let Some((prey, cells)) = row.split_first() else {
                continue;
            };
            let prey = prey.trim();
            if prey.is_empty() && cells.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            if cells.len() > predators.len() {
                return Err(DomainError::InvalidDietMatrix(format!(
                    "row {} has {} values for {} predators",
                    row_idx + 2,
                    cells.len(),
                    predators.len()
                )));
            }
            matrix.add_prey(prey);
            for (predator, cell) in predators.iter().zip(cells) {
                let cell = cell.trim();
                let value = if cell.is_empty() {
                    0.0
                } else {
                    cell.parse::<f64>().map_err(|_| {
                        DomainError::InvalidDietMatrix(format!(
                            "row {} column '{}': '{}' is not a number",
                            row_idx + 2,
                            predator,
                            cell
                        ))
                    })?
                };
                matrix.set(predator, prey, value);
            }
        }
        for predator in &predators {
            matrix.add_predator(predator);
        }
        Ok(matrix)
    }

    fn add_predator(&mut self, predator: &str) {
        if !self.predators.iter().any(|p| p == predator) {
            self.predators.push(predator.to_string());
        }
    }

    fn add_prey(&mut self, prey: &str) {
        if !self.prey.iter().any(|p| p == prey) {
            self.prey.push(prey.to_string());
        }
    }

    pub fn set(&mut self, predator: &str, prey: &str, value: f64) {
        self.add_predator(predator);
        self.add_prey(prey);
        self.values
            .insert((predator.to_string(), prey.to_string()), value);
    }

    /// Proportion of `prey` in the diet of `predator`; zero when absent.
    pub fn get(&self, predator: &str, prey: &str) -> f64 {
        self.values
            .get(&(predator.to_string(), prey.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn predators(&self) -> &[String] {
        &self.predators
    }

    pub fn prey(&self) -> &[String] {
        &self.prey
    }

    /// `(predator, prey)` pairs with a positive value.
    pub fn nonzero_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|((predator, prey), _)| (predator.as_str(), prey.as_str()))
    }
}

/// `1 − mean(|v − mean(v)| / max(v))`.
///
/// Empty, all-zero and constant samples score exactly 1.0.
pub fn stability_score(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().all(|&v| v == values[0]) {
        return 1.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return 1.0;
    }
    let m = mean(values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - m).abs() / max).collect();
    1.0 - mean(&deviations)
}

/// One predator-prey pair across iterations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionStabilityRecord {
    pub predator: String,
    pub prey: String,
    pub raw_values: Vec<f64>,
    pub mean: f64,
    pub stability_score: f64,
}

/// Interaction stability over a set of diet matrices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionAnalysis {
    pub matrices: usize,
    /// Sorted by predator, then prey.
    pub interactions: Vec<InteractionStabilityRecord>,
}

impl InteractionAnalysis {
    pub fn compute(matrices: &[DietMatrix]) -> Self {
        let pairs: BTreeSet<(&str, &str)> =
            matrices.iter().flat_map(DietMatrix::nonzero_pairs).collect();

        let interactions = pairs
            .into_iter()
            .map(|(predator, prey)| {
                let raw_values: Vec<f64> =
                    matrices.iter().map(|m| m.get(predator, prey)).collect();
                InteractionStabilityRecord {
                    predator: predator.to_string(),
                    prey: prey.to_string(),
                    mean: mean(&raw_values),
                    stability_score: stability_score(&raw_values),
                    raw_values,
                }
            })
            .collect();

        Self {
            matrices: matrices.len(),
            interactions,
        }
    }

    /// Interactions scoring below `threshold`, least stable first.
    pub fn unstable(&self, threshold: f64) -> Vec<&InteractionStabilityRecord> {
        let mut unstable: Vec<&InteractionStabilityRecord> = self
            .interactions
            .iter()
            .filter(|r| r.stability_score < threshold)
            .collect();
        unstable.sort_by(|a, b| a.stability_score.total_cmp(&b.stability_score));
        unstable
    }

    pub fn mean_stability(&self) -> f64 {
        let scores: Vec<f64> = self.interactions.iter().map(|r| r.stability_score).collect();
        mean(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_stability_constant_is_one() {
        assert_eq!(stability_score(&[0.4, 0.4, 0.4]), 1.0);
        assert_eq!(stability_score(&[0.1, 0.1, 0.1]), 1.0);
        assert_eq!(stability_score(&[0.3; 7]), 1.0);
        assert_eq!(stability_score(&[0.0, 0.0]), 1.0);
        assert_eq!(stability_score(&[]), 1.0);
    }

    #[test]
    fn test_stability_varied_is_between_zero_and_one() {
        let score = stability_score(&[0.1, 0.9, 0.1]);
        assert!(score > 0.0 && score < 1.0);
        // mean 0.3667, deviations / 0.9 = [0.2963, 0.5926, 0.2963]
        assert!((score - 0.6049).abs() < 1e-3);
    }

    #[test]
    fn test_from_records_orientation() {
        let matrix = DietMatrix::from_records(&records(&[
            &[DIET_MATRIX_ORIENTATION, "Cod", "Seal"],
            &["Sprat", "0.5", ""],
            &["Cod", "0", "0.8"],
        ]))
        .unwrap();

        assert_eq!(matrix.predators(), ["Cod", "Seal"]);
        assert_eq!(matrix.prey(), ["Sprat", "Cod"]);
        assert_eq!(matrix.get("Cod", "Sprat"), 0.5);
        assert_eq!(matrix.get("Seal", "Cod"), 0.8);
        assert_eq!(matrix.get("Seal", "Sprat"), 0.0);
        assert_eq!(matrix.nonzero_pairs().count(), 2);
    }

    #[test]
    fn test_from_records_rejects_text_cells() {
        let err = DietMatrix::from_records(&records(&[&["", "Cod"], &["Sprat", "lots"]]))
            .unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_interaction_absent_counts_as_zero() {
        let mut a = DietMatrix::new();
        a.set("Cod", "Sprat", 0.6);
        let mut b = DietMatrix::new();
        b.set("Seal", "Cod", 0.2);

        let analysis = InteractionAnalysis::compute(&[a, b]);
        assert_eq!(analysis.matrices, 2);
        assert_eq!(analysis.interactions.len(), 2);
        let cod = &analysis.interactions[0];
        assert_eq!(cod.predator, "Cod");
        assert_eq!(cod.raw_values, vec![0.6, 0.0]);
        assert!((cod.mean - 0.3).abs() < 1e-12);
        assert!((cod.stability_score - 0.5).abs() < 1e-12);
        assert_eq!(analysis.unstable(0.7).len(), 2);
    }
}
