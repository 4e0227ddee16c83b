//! Validation metadata file

use crate::layout::VALIDATION_METADATA_FILE;
use crate::storage::write_json;
use ecogroup_domain::ValidationMetadata;
use std::path::{Path, PathBuf};

/// Write `validation_metadata.json` into the batch's parent directory.
pub async fn write_metadata(
    parent: &Path,
    metadata: &ValidationMetadata,
) -> std::io::Result<PathBuf> {
    let path = parent.join(VALIDATION_METADATA_FILE);
    write_json(&path, metadata).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = ValidationMetadata {
            base_name: "ns".to_string(),
            base_dir: dir.path().join("ns_base").display().to_string(),
            num_iterations: 1,
            successful_iterations: 1,
            iteration_dirs: vec![dir.path().join("ns_1").display().to_string()],
            timestamp: "2026-10-19_12-00-00".to_string(),
        };

        let path = write_metadata(dir.path(), &metadata).await.unwrap();

        let written: ValidationMetadata =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written, metadata);
    }
}
