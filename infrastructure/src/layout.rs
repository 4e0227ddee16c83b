//! File names inside a run directory

use std::path::{Path, PathBuf};

pub const SPECIES_DATA_FILE: &str = "02_species_data.json";
pub const GROUPING_TEMPLATE_FILE: &str = "03_grouping_template.json";
pub const ASSIGNMENTS_FILE: &str = "03_grouped_species_assignments.json";
pub const EXTRA_GROUPS_FILE: &str = "03_extra_ai_groups.json";
pub const PROCESSED_TAXA_FILE: &str = "03_processed_taxa.json";
pub const GROUPING_FILE: &str = "03_grouping.json";
pub const HIERARCHY_FILE: &str = "03_grouped_species_hierarchy.json";
pub const GROUPING_REPORT_FILE: &str = "03_grouping_report.txt";
pub const ORACLE_LOG_FILE: &str = "03_oracle_log.jsonl";
pub const DIET_MATRIX_FILE: &str = "05_diet_matrix.csv";
pub const AI_CONFIG_FILE: &str = "ai_config.json";
pub const GEOJSON_FILE: &str = "user_input.geojson";
pub const AI_REFERENCE_GROUPS_FILE: &str = "ai_reference_groups.json";
pub const RUN_LOG_FILE: &str = "ecogroup.log";
pub const VALIDATION_LOG_FILE: &str = "validation.log";
pub const VALIDATION_METADATA_FILE: &str = "validation_metadata.json";

/// Paths of one classification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    dir: PathBuf,
}

impl RunLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn species_data(&self) -> PathBuf {
        self.dir.join(SPECIES_DATA_FILE)
    }

    pub fn grouping_template(&self) -> PathBuf {
        self.dir.join(GROUPING_TEMPLATE_FILE)
    }

    pub fn assignments(&self) -> PathBuf {
        self.dir.join(ASSIGNMENTS_FILE)
    }

    pub fn extra_groups(&self) -> PathBuf {
        self.dir.join(EXTRA_GROUPS_FILE)
    }

    pub fn processed_taxa(&self) -> PathBuf {
        self.dir.join(PROCESSED_TAXA_FILE)
    }

    pub fn grouping(&self) -> PathBuf {
        self.dir.join(GROUPING_FILE)
    }

    pub fn hierarchy(&self) -> PathBuf {
        self.dir.join(HIERARCHY_FILE)
    }

    pub fn grouping_report(&self) -> PathBuf {
        self.dir.join(GROUPING_REPORT_FILE)
    }

    pub fn oracle_log(&self) -> PathBuf {
        self.dir.join(ORACLE_LOG_FILE)
    }

    pub fn ai_config(&self) -> PathBuf {
        self.dir.join(AI_CONFIG_FILE)
    }

    pub fn geojson(&self) -> PathBuf {
        self.dir.join(GEOJSON_FILE)
    }

    pub fn ai_reference_groups(&self) -> PathBuf {
        self.dir.join(AI_REFERENCE_GROUPS_FILE)
    }
}
