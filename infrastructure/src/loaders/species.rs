//! Species data loader

use super::LoadError;
use ecogroup_domain::{Hierarchy, build_hierarchy};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};

/// Control characters JSON forbids; tab, newline and carriage return stay.
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("control character pattern is valid")
});

/// Remove control characters that upstream downloads leave in text fields.
pub fn strip_control_chars(raw: &str) -> std::borrow::Cow<'_, str> {
    CONTROL_CHARS.replace_all(raw, "")
}

/// Read `02_species_data.json` and build the taxonomic tree.
pub async fn load_hierarchy(path: &Path) -> Result<Hierarchy, LoadError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    let cleaned = strip_control_chars(&raw);

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| LoadError::json(path, e))?;
    let Value::Object(records) = value else {
        return Err(LoadError::Format {
            path: path.to_path_buf(),
            message: "expected an object keyed by species name".to_string(),
        });
    };

    let hierarchy = build_hierarchy(&records);
    info!(
        "Built hierarchy from {} species ({} skipped, {} duplicate paths)",
        hierarchy.species_count, hierarchy.skipped, hierarchy.collisions
    );
    if hierarchy.species_count == 0 {
        warn!("{} holds no species with taxonomy", path.display());
    }
    Ok(hierarchy)
}
