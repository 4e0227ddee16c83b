//! Run directory persistence

pub mod checkpoint;
pub mod json;

pub use checkpoint::JsonCheckpointStore;
pub use json::{read_json, write_atomic, write_json};
