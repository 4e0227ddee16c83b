//! Filesystem iteration reader

use crate::layout::{ASSIGNMENTS_FILE, DIET_MATRIX_FILE};
use crate::loaders::{LoadError, read_diet_matrix};
use ecogroup_application::{IterationFiles, IterationReader, ReaderError};
use ecogroup_domain::{AssignmentStore, DietMatrix, is_iteration_dir, iteration_index};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds `<region>_<suffix>` directories next to or under a region path.
///
/// A region may be given as the parent folder holding the iterations or as
/// the `<region>_base` template directory.
#[derive(Debug, Default, Clone)]
pub struct FsIterationReader;

impl FsIterationReader {
    pub fn new() -> Self {
        Self
    }

    /// Directory to scan and the region name for `region_dir`.
    fn scan_target(region_dir: &Path) -> Result<(PathBuf, String), ReaderError> {
        let name = region_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ReaderError::Io {
                path: region_dir.to_path_buf(),
                message: "not a directory name".to_string(),
            })?;

        if let Some(base_name) = name.strip_suffix(ecogroup_domain::validation::BASE_SUFFIX) {
            let parent = region_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok((parent, base_name.to_string()));
        }
        Ok((region_dir.to_path_buf(), name))
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> ReaderError {
    ReaderError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

impl IterationReader for FsIterationReader {
    fn discover(&self, region_dir: &Path) -> Result<Vec<IterationFiles>, ReaderError> {
        let (scan_dir, base_name) = Self::scan_target(region_dir)?;
        let pattern = format!(
            "{}/{}_*",
            glob::Pattern::escape(&scan_dir.to_string_lossy()),
            glob::Pattern::escape(&base_name)
        );

        let mut iterations = Vec::new();
        for entry in glob::glob(&pattern).map_err(|e| io_error(&scan_dir, e))? {
            let dir = entry.map_err(|e| io_error(&scan_dir, e))?;
            if !dir.is_dir() {
                continue;
            }
            let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            if !is_iteration_dir(&base_name, &name) {
                continue;
            }
            iterations.push(IterationFiles {
                assignments: existing(dir.join(ASSIGNMENTS_FILE)),
                diet_matrix: existing(dir.join(DIET_MATRIX_FILE)),
                name,
                dir,
            });
        }

        // Numbered runs in numeric order, anything else after them by name
        iterations.sort_by_cached_key(|it| {
            let index = iteration_index(&base_name, &it.name);
            (index.is_none(), index, it.name.clone())
        });
        debug!(
            "{}: {} iteration directories under {}",
            base_name,
            iterations.len(),
            scan_dir.display()
        );
        Ok(iterations)
    }

    fn read_assignments(&self, path: &Path) -> Result<AssignmentStore, ReaderError> {
        let raw = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| ReaderError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        AssignmentStore::from_value(&value).map_err(|e| ReaderError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_diet_matrix(&self, path: &Path) -> Result<DietMatrix, ReaderError> {
        read_diet_matrix(path).map_err(|e| match e {
            LoadError::Io { path, source } => ReaderError::Io {
                path,
                message: source.to_string(),
            },
            other => ReaderError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })
    }
}
