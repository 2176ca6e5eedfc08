//! Configuration file loading for triad
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TRIAD_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./triad.toml` or `./.triad.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/triad/config.toml`
//! 5. `BASE_URL` / `API_KEY` / `MODEL` environment variables
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, FileConfig, FileCorpusConfig, FileModelConfig, FileOutputConfig,
    FileSandboxConfig, ModelSettings,
};
pub use loader::ConfigLoader;
