//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["decider.toml", ".decider.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `DECIDER_` environment variables (`DECIDER_ENGINE__DEFAULT_K=1`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./decider.toml` or `./.decider.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/decider/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path,
        )
        .merge(Env::prefixed("DECIDER_").split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers only, rooted at `project_dir`.
    fn figment(global: Option<&Path>, project_dir: &Path, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = global
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }
        if let Some(project) = Self::project_config_in(project_dir) {
            figment = figment.merge(Toml::file(project));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("decider").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Describe the config file locations, in priority order
    pub fn config_sources(explicit: Option<&Path>) -> Vec<(String, PathBuf, bool)> {
        let mut sources = Vec::new();
        if let Some(path) = explicit {
            sources.push(("Explicit".to_string(), path.to_path_buf(), path.exists()));
        }
        match Self::project_config_path() {
            Some(path) => sources.push(("Project".to_string(), path, true)),
            None => sources.push((
                "Project".to_string(),
                PathBuf::from(PROJECT_FILES[0]),
                false,
            )),
        }
        if let Some(path) = Self::global_config_path() {
            let exists = path.exists();
            sources.push(("Global".to_string(), path, exists));
        }
        sources
    }
}
