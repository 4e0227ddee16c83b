//! Readers for the files a run consumes
//!
//! Species data and grouping templates come from earlier pipeline steps or
//! from the user; diet matrices are read back during analysis.

pub mod diet_csv;
pub mod species;
pub mod template;

use ecogroup_domain::DomainError;
use std::path::PathBuf;
use thiserror::Error;

pub use diet_csv::{parse_csv, read_diet_matrix};
pub use species::{load_hierarchy, strip_control_chars};
pub use template::{TemplateLoader, decode_text, load_template};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("{path}: {source}")]
    Domain {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        LoadError::Json {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn domain(path: impl Into<PathBuf>, source: DomainError) -> Self {
        LoadError::Domain {
            path: path.into(),
            source,
        }
    }
}
