//! Per-run settings (`ai_config.json`)
//!
//! Written next to the run's data by the setup step. Keys that are present
//! override the matching configuration values for that run only.

use super::FileConfig;
use crate::layout::RunLayout;
use crate::storage::read_json;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunSettings {
    /// Oracle model alias
    #[serde(rename = "groupSpeciesAI")]
    pub group_species_ai: Option<String>,
    pub force_grouping: Option<bool>,
    pub research_focus: Option<String>,
    pub grouping_template: Option<GroupingTemplateSetting>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingTemplateSetting {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub path: Option<String>,
}

impl RunSettings {
    /// Read `ai_config.json` from the run directory; absent file = no overrides.
    pub async fn load(layout: &RunLayout) -> std::io::Result<Self> {
        let path = layout.ai_config();
        let settings = read_json::<Self>(&path).await?.unwrap_or_default();
        debug!("Run settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn apply(&self, config: &mut FileConfig) {
        if let Some(model) = self.group_species_ai.as_deref().filter(|m| !m.trim().is_empty()) {
            config.oracle.model = model.to_string();
        }
        if let Some(force) = self.force_grouping {
            config.classification.force_grouping = force;
        }
        if let Some(focus) = &self.research_focus {
            config.classification.research_focus = Some(focus.clone());
        }
        if let Some(template) = &self.grouping_template {
            if let Some(kind) = &template.kind {
                config.classification.template = kind.clone();
            }
            if template.kind.as_deref() == Some("upload")
                && let Some(path) = &template.path
            {
                config.classification.upload_path = Some(path.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RunSettings::load(&RunLayout::new(dir.path())).await.unwrap();

        let mut config = FileConfig::default();
        settings.apply(&mut config);
        assert_eq!(config, FileConfig::default());
    }

    #[tokio::test]
    async fn test_overrides_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(dir.path());
        std::fs::write(
            layout.ai_config(),
            r#"{
                "groupSpeciesAI": "gemini",
                "constructDietMatrixAI": "claude",
                "forceGrouping": true,
                "researchFocus": "Seabird bycatch",
                "groupingTemplate": {"type": "upload", "path": "my_groups.json"}
            }"#,
        )
        .unwrap();

        let settings = RunSettings::load(&layout).await.unwrap();
        let mut config = FileConfig::default();
        settings.apply(&mut config);

        assert_eq!(config.oracle.model, "gemini");
        assert!(config.classification.force_grouping);
        assert_eq!(
            config.classification.research_focus.as_deref(),
            Some("Seabird bycatch")
        );
        assert_eq!(config.classification.template, "upload");
        assert_eq!(
            config.classification.upload_path.as_deref(),
            Some("my_groups.json")
        );
    }

    #[test]
    fn test_default_template_path_is_not_an_upload() {
        let settings = RunSettings {
            grouping_template: Some(GroupingTemplateSetting {
                kind: Some("default".to_string()),
                path: Some("03_grouping_template.json".to_string()),
            }),
            ..Default::default()
        };
        let mut config = FileConfig::default();
        settings.apply(&mut config);
        assert!(config.classification.upload_path.is_none());
    }
}
