//! Validation batch adapters

pub mod metadata;
pub mod reader;
pub mod runner;

pub use metadata::write_metadata;
pub use reader::FsIterationReader;
pub use runner::{DEFAULT_FATAL_MARKERS, ProcessIterationRunner};
