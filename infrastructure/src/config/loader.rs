//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["triad.toml", ".triad.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TRIAD_` environment variables (`TRIAD_MODEL__API_KEY`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./triad.toml` or `./.triad.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/triad/config.toml`
    /// 5. Plain `BASE_URL`, `API_KEY` and `MODEL` environment variables
    /// 6. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Self::fallback_env());

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("TRIAD_").split("__"));

        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load default values and environment variables only, skipping every
    /// config file (for --no-config)
    pub fn load_defaults() -> Result<FileConfig, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Self::fallback_env())
            .merge(Env::prefixed("TRIAD_").split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Un-prefixed variables accepted for the model endpoint
    fn fallback_env() -> Env {
        Env::raw()
            .only(&["BASE_URL", "API_KEY", "MODEL"])
            .map(|key| {
                if key == "model" {
                    "model.id".into()
                } else {
                    format!("model.{}", key.as_str().to_ascii_lowercase()).into()
                }
            })
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("triad").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}
