//! JSON checkpoint store
//!
//! Keeps the assignment store, the extra-group store and the processed taxa
//! set in three JSON files inside the run directory. Each file is replaced
//! atomically, so an interrupted save leaves the previous rank's state.

use super::json::{read_json, write_json};
use crate::layout::RunLayout;
use async_trait::async_trait;
use ecogroup_application::{CheckpointError, CheckpointStore};
use ecogroup_domain::{AssignmentStore, Checkpoint, ProcessedTaxaSet};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonCheckpointStore {
    assignments: PathBuf,
    extra_groups: PathBuf,
    processed: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(layout: &RunLayout) -> Self {
        Self {
            assignments: layout.assignments(),
            extra_groups: layout.extra_groups(),
            processed: layout.processed_taxa(),
        }
    }
}

async fn load_or_default<T: DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, CheckpointError> {
    read_json(path)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| CheckpointError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

async fn save_to<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CheckpointError> {
    write_json(path, value)
        .await
        .map_err(|e| CheckpointError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

#[async_trait]
impl CheckpointStore for JsonCheckpointStore {
    async fn load(&self) -> Result<Checkpoint, CheckpointError> {
        let assignments: AssignmentStore = load_or_default(&self.assignments).await?;
        let extra_groups: AssignmentStore = load_or_default(&self.extra_groups).await?;
        let processed: ProcessedTaxaSet = load_or_default(&self.processed).await?;

        let checkpoint = Checkpoint::restore(assignments, extra_groups, processed);
        debug!(
            "Loaded checkpoint: {} groups, {} processed taxa",
            checkpoint.assignments.len(),
            checkpoint.processed.len()
        );
        Ok(checkpoint)
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        save_to(&self.assignments, &checkpoint.assignments).await?;
        save_to(&self.extra_groups, &checkpoint.extra_groups).await?;
        save_to(&self.processed, &checkpoint.processed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecogroup_domain::TaxonNode;

    #[tokio::test]
    async fn test_missing_files_give_empty_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCheckpointStore::new(&RunLayout::new(dir.path()));

        let checkpoint = store.load().await.unwrap();
        assert_eq!(checkpoint, Checkpoint::new());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path());
        let store = JsonCheckpointStore::new(&layout);

        let mut checkpoint = Checkpoint::new();
        checkpoint.assignments.assign(
            "Demersal fish",
            "Gadidae",
            TaxonNode::new().with_child("Gadus morhua", TaxonNode::leaf("69")),
        );
        checkpoint
            .extra_groups
            .assign("Jellyfish", "Scyphozoa", TaxonNode::new());
        checkpoint.processed.insert("Gadidae");
        checkpoint.processed.insert("Scyphozoa");
        store.save(&checkpoint).await.unwrap();
        // saving twice is harmless
        store.save(&checkpoint).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, checkpoint);
        assert!(store.contains("Gadidae").await.unwrap());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(layout.assignments()).unwrap()).unwrap();
        assert_eq!(
            raw["Demersal fish"]["Gadidae"]["Gadus morhua"]["specCode"],
            "69"
        );
    }

    #[tokio::test]
    async fn test_processed_set_rebuilt_from_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path());
        std::fs::write(
            layout.assignments(),
            r#"{"Fish": {"Gadidae": {"Gadus morhua": {"specCode": 69}}}}"#,
        )
        .unwrap();

        let store = JsonCheckpointStore::new(&layout);
        let checkpoint = store.load().await.unwrap();
        assert!(checkpoint.is_processed("Gadidae"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path());
        std::fs::write(layout.processed_taxa(), "[1, 2").unwrap();

        let store = JsonCheckpointStore::new(&layout);
        assert!(matches!(
            store.load().await,
            Err(CheckpointError::Decode { .. })
        ));
    }
}
