//! Checkpoint store port
//!
//! Persists the assignment store, the extra-group store and the processed
//! taxa set between ranks so an interrupted run resumes without repeating
//! oracle calls.

use async_trait::async_trait;
use ecogroup_domain::Checkpoint;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Cannot decode {path}: {message}")]
    Decode { path: String, message: String },
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the last saved state. Missing files yield an empty checkpoint.
    async fn load(&self) -> Result<Checkpoint, CheckpointError>;

    /// Persist the full state. Saving the same state twice is harmless.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;

    /// Whether a taxon has already been resolved.
    async fn contains(&self, taxon: &str) -> Result<bool, CheckpointError> {
        Ok(self.load().await?.is_processed(taxon))
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    state: Mutex<Checkpoint>,
    saves: Mutex<usize>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn snapshot(&self) -> Checkpoint {
        self.state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|s| *s).unwrap_or(0)
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self) -> Result<Checkpoint, CheckpointError> {
        Ok(self.snapshot())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        if let Ok(mut state) = self.state.lock() {
            *state = checkpoint.clone();
        }
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}
