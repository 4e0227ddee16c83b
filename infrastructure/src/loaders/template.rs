//! Grouping template loader

use super::LoadError;
use crate::layout::RunLayout;
use ecogroup_domain::{ReferenceGroupRegistry, TemplateSource};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Decode template bytes as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Template is not UTF-8, decoding as Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

/// Read a grouping template file into a registry.
pub async fn load_template(path: &Path) -> Result<ReferenceGroupRegistry, LoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;
    let text = decode_text(bytes);
    let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::json(path, e))?;
    ReferenceGroupRegistry::from_template_value(&value).map_err(|e| LoadError::domain(path, e))
}

/// Picks the template file for a template source.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    default_path: PathBuf,
    layout: RunLayout,
}

impl TemplateLoader {
    pub fn new(default_path: impl Into<PathBuf>, layout: RunLayout) -> Self {
        Self {
            default_path: default_path.into(),
            layout,
        }
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    /// File to load for `source`.
    ///
    /// Relative upload paths are looked up in the run directory first.
    /// Sources without a usable file fall back to the default template.
    pub fn path_for(&self, source: TemplateSource, upload: Option<&Path>) -> PathBuf {
        match source {
            TemplateSource::Default => self.default_path.clone(),
            TemplateSource::Upload => match upload {
                Some(path) if path.is_absolute() => path.to_path_buf(),
                Some(path) => {
                    let in_run = self.layout.dir().join(path);
                    if in_run.exists() {
                        in_run
                    } else {
                        path.to_path_buf()
                    }
                }
                None => {
                    warn!("Upload template selected without a path, using the default template");
                    self.default_path.clone()
                }
            },
            TemplateSource::Ecobase => {
                warn!("EcoBase template search is not available, using the default template");
                self.default_path.clone()
            }
            TemplateSource::Geojson => self.layout.grouping_template(),
        }
    }

    pub async fn load(
        &self,
        source: TemplateSource,
        upload: Option<&Path>,
    ) -> Result<ReferenceGroupRegistry, LoadError> {
        let path = self.path_for(source, upload);
        debug!("Loading {} template from {}", source, path.display());
        load_template(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1_fallback() {
        assert_eq!(decode_text(b"Benthos".to_vec()), "Benthos");
        // 0xE9 alone is invalid UTF-8 and 'é' in Latin-1
        assert_eq!(decode_text(vec![b'C', b'a', b'f', 0xE9]), "Café");
    }

    #[tokio::test]
    async fn test_load_latin1_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        let mut bytes = br#"[{"Demersal fish": "Cod and "#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(br#"glefin"}, {"Seabirds": "Gulls"}, {"Demersal fish": "Bottom fish"}]"#);
        std::fs::write(&path, bytes).unwrap();

        let registry = load_template(&path).await.unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().next(), Some("Demersal fish"));
        assert_eq!(registry.get("Demersal fish"), Some("Bottom fish"));
    }

    #[tokio::test]
    async fn test_invalid_template_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        std::fs::write(&path, "42").unwrap();

        assert!(matches!(
            load_template(&path).await,
            Err(LoadError::Domain { .. })
        ));
    }

    #[test]
    fn test_path_for_sources() {
        let run = tempfile::tempdir().unwrap();
        std::fs::write(run.path().join("mine.json"), "[]").unwrap();
        let loader = TemplateLoader::new("03_grouping_template.json", RunLayout::new(run.path()));

        assert_eq!(
            loader.path_for(TemplateSource::Default, None),
            PathBuf::from("03_grouping_template.json")
        );
        assert_eq!(
            loader.path_for(TemplateSource::Ecobase, None),
            PathBuf::from("03_grouping_template.json")
        );
        assert_eq!(
            loader.path_for(TemplateSource::Upload, Some(Path::new("mine.json"))),
            run.path().join("mine.json")
        );
        assert_eq!(
            loader.path_for(TemplateSource::Upload, Some(Path::new("elsewhere.json"))),
            PathBuf::from("elsewhere.json")
        );
        assert_eq!(
            loader.path_for(TemplateSource::Geojson, None),
            run.path().join("03_grouping_template.json")
        );
    }
}
