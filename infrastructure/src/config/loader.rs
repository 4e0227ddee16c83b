//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["ecogroup.toml", ".ecogroup.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./ecogroup.toml` or `./.ecogroup.toml`
    /// 3. Global: `$XDG_CONFIG_HOME/ecogroup/config.toml`
    /// 4. `ECOGROUP_` environment variables, `__` between section and key
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        if let Some(path) = config_path
            && !path.is_file()
        {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }
        Self::figment(config_path, Self::project_config_path(), Self::global_config_path())
            .extract()
            .map_err(Box::new)
    }

    fn figment(
        explicit: Option<&Path>,
        project: Option<PathBuf>,
        global: Option<PathBuf>,
    ) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Env::prefixed("ECOGROUP_").split("__"));

        if let Some(global) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(global));
        }
        if let Some(project) = project {
            figment = figment.merge(Toml::file(project));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/ecogroup/config.toml` (or the platform equivalent)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ecogroup").join("config.toml"))
    }

    /// The first project-level config file that exists
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations (for `--show-config`)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mark = |found: bool| if found { "[FOUND]" } else { "[     ]" };
        let mut lines = Vec::new();

        if let Some(path) = explicit {
            lines.push(format!("  {} Explicit: {}", mark(path.exists()), path.display()));
        }
        match Self::project_config_path() {
            Some(path) => lines.push(format!("  {} Project: {}", mark(true), path.display())),
            None => lines.push(format!(
                "  {} Project: ./{} or ./{}",
                mark(false),
                PROJECT_FILES[0],
                PROJECT_FILES[1]
            )),
        }
        if let Some(path) = Self::global_config_path() {
            lines.push(format!("  {} Global:  {}", mark(path.exists()), path.display()));
        }
        lines.push("  [     ] Env:     ECOGROUP_<SECTION>__<KEY>".to_string());
        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.validation.timeout_secs, 3600);
        assert_eq!(config.oracle.api_key_env, "ECOGROUP_API_KEY");
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("ecogroup/config.toml"));
        }
    }

    #[test]
    fn test_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("ecogroup.toml");
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(
            &global,
            "[classification]\nchunk_size = 2\n[validation]\nworkers = 2\n[oracle]\nmodel = \"gemini\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[classification]\nchunk_size = 3\n[validation]\nworkers = 3\n")
            .unwrap();
        std::fs::write(&explicit, "[classification]\nchunk_size = 4\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&explicit), Some(project), Some(global))
                .extract()
                .unwrap();

        assert_eq!(config.classification.chunk_size, 4);
        assert_eq!(config.validation.workers, 3);
        assert_eq!(config.oracle.model, "gemini");
        assert_eq!(config.validation.iterations, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load(Some(&dir.path().join("absent.toml")));
        assert!(result.is_err());
    }
}
