//! Validation batch naming and metadata

use serde::{Deserialize, Serialize};

/// Suffix marking the template directory of a validation batch.
pub const BASE_SUFFIX: &str = "_base";

/// Timestamp layout used in the metadata file.
pub const METADATA_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Batch name for a base directory name: `north_sea_base` → `north_sea`.
pub fn base_name_from_dir(dir_name: &str) -> &str {
    dir_name.strip_suffix(BASE_SUFFIX).unwrap_or(dir_name)
}

/// Directory name of iteration `index` (1-based).
pub fn iteration_dir_name(base_name: &str, index: usize) -> String {
    format!("{}_{}", base_name, index)
}

/// Whether `dir_name` is an iteration directory of `base_name`.
///
/// `<base>_<suffix>` qualifies, except the base directory itself.
pub fn is_iteration_dir(base_name: &str, dir_name: &str) -> bool {
    dir_name
        .strip_prefix(base_name)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|suffix| !suffix.is_empty() && format!("_{}", suffix) != BASE_SUFFIX)
}

/// Numeric index of an iteration directory: `north_sea_10` → `Some(10)`.
pub fn iteration_index(base_name: &str, dir_name: &str) -> Option<usize> {
    dir_name
        .strip_prefix(base_name)?
        .strip_prefix('_')?
        .parse()
        .ok()
}

/// Written next to the iteration directories once every run succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMetadata {
    pub base_name: String,
    pub base_dir: String,
    pub num_iterations: usize,
    pub successful_iterations: usize,
    pub iteration_dirs: Vec<String>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name_from_dir("north_sea_base"), "north_sea");
        assert_eq!(base_name_from_dir("baltic"), "baltic");
    }

    #[test]
    fn test_iteration_dir_name() {
        assert_eq!(iteration_dir_name("north_sea", 3), "north_sea_3");
    }

    #[test]
    fn test_is_iteration_dir() {
        assert!(is_iteration_dir("north_sea", "north_sea_1"));
        assert!(is_iteration_dir("north_sea", "north_sea_rerun"));
        assert!(!is_iteration_dir("north_sea", "north_sea_base"));
        assert!(!is_iteration_dir("north_sea", "north_sea"));
        assert!(!is_iteration_dir("north_sea", "north_sea_"));
        assert!(!is_iteration_dir("north_sea", "baltic_1"));
    }

    #[test]
    fn test_iteration_index() {
        assert_eq!(iteration_index("north_sea", "north_sea_10"), Some(10));
        assert_eq!(iteration_index("north_sea", "north_sea_rerun"), None);
        assert_eq!(iteration_index("north_sea", "baltic_1"), None);
    }

    #[test]
    fn test_metadata_field_names() {
        let metadata = ValidationMetadata {
            base_name: "ns".to_string(),
            base_dir: "/runs/ns_base".to_string(),
            num_iterations: 2,
            successful_iterations: 2,
            iteration_dirs: vec!["/runs/ns_1".to_string(), "/runs/ns_2".to_string()],
            timestamp: "2025-01-01_00-00-00".to_string(),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["successful_iterations"], 2);
        assert_eq!(value["iteration_dirs"][1], "/runs/ns_2");
    }
}
