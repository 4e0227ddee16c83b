//! Iteration reader port
//!
//! Discovers the iteration directories of a validation batch and decodes
//! their outputs for the consistency analyzer.

use ecogroup_domain::{AssignmentStore, DietMatrix};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Cannot read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Cannot decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Outputs found in one iteration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationFiles {
    /// Directory name, e.g. `north_sea_3`.
    pub name: String,
    pub dir: PathBuf,
    pub assignments: Option<PathBuf>,
    pub diet_matrix: Option<PathBuf>,
}

pub trait IterationReader: Send + Sync {
    /// Iteration directories of the batch rooted at `region_dir`, sorted by
    /// name.
    fn discover(&self, region_dir: &Path) -> Result<Vec<IterationFiles>, ReaderError>;

    fn read_assignments(&self, path: &Path) -> Result<AssignmentStore, ReaderError>;

    fn read_diet_matrix(&self, path: &Path) -> Result<DietMatrix, ReaderError>;
}
