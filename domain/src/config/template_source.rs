//! Grouping template source value object

use serde::{Deserialize, Serialize};

/// Where the initial reference groups come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSource {
    /// Bundled or configured template file
    #[default]
    Default,
    /// User-supplied template file
    Upload,
    /// Groups harvested from published EwE models
    Ecobase,
    /// Synthesized by the oracle from the study area polygon
    Geojson,
}

impl TemplateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSource::Default => "default",
            TemplateSource::Upload => "upload",
            TemplateSource::Ecobase => "ecobase",
            TemplateSource::Geojson => "geojson",
        }
    }

    /// All accepted names, for validation messages.
    pub fn names() -> [&'static str; 4] {
        ["default", "upload", "ecobase", "geojson"]
    }
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TemplateSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(TemplateSource::Default),
            "upload" => Ok(TemplateSource::Upload),
            "ecobase" => Ok(TemplateSource::Ecobase),
            "geojson" => Ok(TemplateSource::Geojson),
            other => Err(format!("unknown template source: {}", other)),
        }
    }
}
