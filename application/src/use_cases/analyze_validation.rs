//! Analyze validation use case
//!
//! Reads the outputs of every iteration of one or more validation batches
//! and measures how consistently species, groups and diet interactions were
//! reproduced.

use crate::ports::iteration_reader::{IterationReader, ReaderError};
use ecogroup_domain::{
    AnalysisThresholds, ConsistencyAnalysis, IncompleteIteration, InteractionAnalysis,
    IterationAssignments, RegionAnalysis, ValidationReport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const MISSING_ASSIGNMENTS: &str = "species groups";
pub const MISSING_DIET_MATRIX: &str = "diet matrix";

#[derive(Error, Debug)]
pub enum AnalyzeValidationError {
    #[error("No validation directories given")]
    NoRegions,

    #[error("No usable assignment files under {0}")]
    NoAssignments(PathBuf),

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Input for the AnalyzeValidation use case
#[derive(Debug, Clone)]
pub struct AnalyzeValidationInput {
    /// Batch directories, one per region.
    pub regions: Vec<PathBuf>,
    pub thresholds: AnalysisThresholds,
}

impl AnalyzeValidationInput {
    pub fn new(regions: Vec<PathBuf>) -> Self {
        Self {
            regions,
            thresholds: AnalysisThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AnalysisThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

pub struct AnalyzeValidationUseCase<R: IterationReader> {
    reader: Arc<R>,
}

impl<R: IterationReader> AnalyzeValidationUseCase<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Analyze every region. A region that fails is logged and left out;
    /// the call fails only when no region could be analyzed.
    pub fn execute(
        &self,
        input: AnalyzeValidationInput,
    ) -> Result<ValidationReport, AnalyzeValidationError> {
        if input.regions.is_empty() {
            return Err(AnalyzeValidationError::NoRegions);
        }

        let mut regions = Vec::new();
        let mut first_error = None;

        for region_dir in &input.regions {
            match self.analyze_region(region_dir, input.thresholds) {
                Ok(region) => regions.push(region),
                Err(e) => {
                    error!("Skipping {}: {}", region_dir.display(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if regions.is_empty()
            && let Some(e) = first_error
        {
            return Err(e);
        }

        Ok(ValidationReport {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            regions,
        })
    }

    /// Analyze the iterations found under one batch directory.
    pub fn analyze_region(
        &self,
        region_dir: &Path,
        thresholds: AnalysisThresholds,
    ) -> Result<RegionAnalysis, AnalyzeValidationError> {
        let name = region_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| region_dir.display().to_string());
        let iterations = self.reader.discover(region_dir)?;
        info!("{}: found {} iteration directories", name, iterations.len());

        let mut assignments: Vec<IterationAssignments> = Vec::new();
        let mut group_iterations = Vec::new();
        let mut matrices = Vec::new();
        let mut matrix_iterations = Vec::new();
        let mut incomplete = Vec::new();

        for files in &iterations {
            let mut missing = Vec::new();

            match &files.assignments {
                Some(path) => match self.reader.read_assignments(path) {
                    Ok(store) => {
                        let species = store.species_assignments();
                        if species.is_empty() {
                            warn!("{}: assignment file holds no species", files.name);
                            missing.push(MISSING_ASSIGNMENTS.to_string());
                        } else {
                            assignments.push(species);
                            group_iterations.push(files.name.clone());
                        }
                    }
                    Err(e) => {
                        warn!("{}: {}", files.name, e);
                        missing.push(MISSING_ASSIGNMENTS.to_string());
                    }
                },
                None => missing.push(MISSING_ASSIGNMENTS.to_string()),
            }

            match &files.diet_matrix {
                Some(path) => match self.reader.read_diet_matrix(path) {
                    Ok(matrix) => {
                        matrices.push(matrix);
                        matrix_iterations.push(files.name.clone());
                    }
                    Err(e) => {
                        warn!("{}: {}", files.name, e);
                        missing.push(MISSING_DIET_MATRIX.to_string());
                    }
                },
                None => missing.push(MISSING_DIET_MATRIX.to_string()),
            }

            if !missing.is_empty() {
                incomplete.push(IncompleteIteration {
                    name: files.name.clone(),
                    missing,
                });
            }
        }

        if assignments.is_empty() {
            return Err(AnalyzeValidationError::NoAssignments(
                region_dir.to_path_buf(),
            ));
        }

        let consistency = ConsistencyAnalysis::compute(&assignments);
        let interactions = if matrices.is_empty() {
            warn!("{}: no diet matrices, skipping interaction analysis", name);
            None
        } else {
            Some(InteractionAnalysis::compute(&matrices))
        };

        info!(
            "{}: {} species over {} iterations, {} diet matrices",
            name,
            consistency.species.len(),
            assignments.len(),
            matrices.len()
        );

        Ok(
            RegionAnalysis::new(name, consistency, interactions, thresholds)
                .with_iterations(group_iterations, matrix_iterations)
                .with_incomplete(incomplete),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::iteration_reader::IterationFiles;
    use ecogroup_domain::{AssignmentStore, DietMatrix, TaxonNode};
    use std::collections::HashMap;

    /// Serves iterations from memory; paths are lookup keys.
    #[derive(Default)]
    struct MemoryReader {
        iterations: HashMap<PathBuf, Vec<IterationFiles>>,
        stores: HashMap<PathBuf, AssignmentStore>,
        matrices: HashMap<PathBuf, DietMatrix>,
    }

    impl MemoryReader {
        fn add_iteration(
            &mut self,
            region: &str,
            name: &str,
            store: Option<AssignmentStore>,
            matrix: Option<DietMatrix>,
        ) {
            let dir = PathBuf::from(region).join(name);
            let assignments = store.map(|s| {
                let path = dir.join("groups.json");
                self.stores.insert(path.clone(), s);
                path
            });
            let diet_matrix = matrix.map(|m| {
                let path = dir.join("diet.csv");
                self.matrices.insert(path.clone(), m);
                path
            });
            self.iterations
                .entry(PathBuf::from(region))
                .or_default()
                .push(IterationFiles {
                    name: name.to_string(),
                    dir,
                    assignments,
                    diet_matrix,
                });
        }
    }

    impl IterationReader for MemoryReader {
        fn discover(&self, region_dir: &Path) -> Result<Vec<IterationFiles>, ReaderError> {
            self.iterations
                .get(region_dir)
                .cloned()
                .ok_or_else(|| ReaderError::Io {
                    path: region_dir.to_path_buf(),
                    message: "not found".into(),
                })
        }

        fn read_assignments(&self, path: &Path) -> Result<AssignmentStore, ReaderError> {
            self.stores.get(path).cloned().ok_or_else(|| ReaderError::Decode {
                path: path.to_path_buf(),
                message: "bad json".into(),
            })
        }

        fn read_diet_matrix(&self, path: &Path) -> Result<DietMatrix, ReaderError> {
            self.matrices.get(path).cloned().ok_or_else(|| ReaderError::Decode {
                path: path.to_path_buf(),
                message: "bad csv".into(),
            })
        }
    }

    fn store(pairs: &[(&str, &str)]) -> AssignmentStore {
        let mut store = AssignmentStore::new();
        for (species, group) in pairs {
            store.assign(*group, *species, TaxonNode::leaf("1"));
        }
        store
    }

    fn matrix(value: f64) -> DietMatrix {
        let mut m = DietMatrix::new();
        m.set("Cod", "Shrimp", value);
        m
    }

    #[test]
    fn test_region_consistency_and_interactions() {
        let mut reader = MemoryReader::default();
        reader.add_iteration(
            "north_sea",
            "north_sea_1",
            Some(store(&[("Gadus morhua", "Fish"), ("Crangon crangon", "Shrimp")])),
            Some(matrix(0.4)),
        );
        reader.add_iteration(
            "north_sea",
            "north_sea_2",
            Some(store(&[("Gadus morhua", "Fish"), ("Crangon crangon", "Benthos")])),
            Some(matrix(0.4)),
        );
        reader.add_iteration(
            "north_sea",
            "north_sea_3",
            Some(store(&[("Gadus morhua", "Fish"), ("Crangon crangon", "Shrimp")])),
            None,
        );

        let use_case = AnalyzeValidationUseCase::new(Arc::new(reader));
        let report = use_case
            .execute(AnalyzeValidationInput::new(vec![PathBuf::from("north_sea")]))
            .unwrap();

        let region = &report.regions[0];
        assert_eq!(region.name, "north_sea");
        assert_eq!(region.group_iterations.len(), 3);
        assert_eq!(region.matrix_iterations.len(), 2);
        assert_eq!(region.incomplete.len(), 1);
        assert_eq!(region.incomplete[0].missing, vec![MISSING_DIET_MATRIX]);
        assert_eq!(region.summary.species_analyzed, 2);
        assert_eq!(region.summary.unstable_species, vec!["Crangon crangon"]);

        let interactions = region.interactions.as_ref().unwrap();
        assert_eq!(interactions.interactions.len(), 1);
        assert!((interactions.interactions[0].stability_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreadable_files_are_excluded() {
        let mut reader = MemoryReader::default();
        reader.add_iteration(
            "baltic",
            "baltic_1",
            Some(store(&[("Gadus morhua", "Fish")])),
            None,
        );
        reader.iterations.get_mut(Path::new("baltic")).unwrap().push(IterationFiles {
            name: "baltic_2".into(),
            dir: PathBuf::from("baltic/baltic_2"),
            assignments: Some(PathBuf::from("baltic/baltic_2/broken.json")),
            diet_matrix: None,
        });

        let use_case = AnalyzeValidationUseCase::new(Arc::new(reader));
        let region = use_case
            .analyze_region(Path::new("baltic"), AnalysisThresholds::default())
            .unwrap();

        assert_eq!(region.group_iterations, vec!["baltic_1"]);
        assert!(region.interactions.is_none());
        assert_eq!(region.incomplete.len(), 2);
    }

    #[test]
    fn test_region_without_assignments_fails() {
        let mut reader = MemoryReader::default();
        reader.add_iteration("empty", "empty_1", None, Some(matrix(0.1)));

        let use_case = AnalyzeValidationUseCase::new(Arc::new(reader));
        let err = use_case
            .execute(AnalyzeValidationInput::new(vec![PathBuf::from("empty")]))
            .unwrap_err();
        assert!(matches!(err, AnalyzeValidationError::NoAssignments(_)));
    }

    #[test]
    fn test_failed_region_is_left_out() {
        let mut reader = MemoryReader::default();
        reader.add_iteration(
            "north_sea",
            "north_sea_1",
            Some(store(&[("Gadus morhua", "Fish")])),
            None,
        );

        let use_case = AnalyzeValidationUseCase::new(Arc::new(reader));
        let report = use_case
            .execute(AnalyzeValidationInput::new(vec![
                PathBuf::from("missing"),
                PathBuf::from("north_sea"),
            ]))
            .unwrap();
        assert_eq!(report.regions.len(), 1);
    }
}
