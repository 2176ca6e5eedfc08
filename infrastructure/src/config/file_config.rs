//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use application types where appropriate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use triad_application::{ExecutionParams, RetryConfig};

/// Configuration errors, raised before any work starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("{0} cannot be 0")]
    ZeroValue(&'static str),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Raw model configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model id sent to the chat-completions endpoint
    pub id: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Overrides `execution.max_tokens` when set
    pub max_tokens: Option<u32>,
    /// Timeout in seconds for one API call
    pub timeout_seconds: u64,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            id: None,
            base_url: None,
            api_key: None,
            max_tokens: None,
            timeout_seconds: 600,
        }
    }
}

/// Raw corpus configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCorpusConfig {
    /// Directory holding the data files and manuals
    pub path: Option<PathBuf>,
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Parent directory of the per-run directories
    pub runs_dir: PathBuf,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            runs_dir: PathBuf::from("runs"),
        }
    }
}

/// Raw sandbox configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSandboxConfig {
    /// Python interpreter; searched on PATH when unset
    pub python: Option<String>,
    /// Wall-clock limit for one code block
    pub timeout_seconds: u64,
}

impl Default for FileSandboxConfig {
    fn default() -> Self {
        Self {
            python: None,
            timeout_seconds: 120,
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: FileModelConfig,
    pub retry: RetryConfig,
    pub execution: ExecutionParams,
    pub corpus: FileCorpusConfig,
    pub output: FileOutputConfig,
    pub sandbox: FileSandboxConfig,
}

/// Model settings with every required field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub id: String,
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl FileConfig {
    /// Validate the configuration and resolve the required model settings
    pub fn validate(&self) -> Result<ModelSettings, ConfigError> {
        if self.model.timeout_seconds == 0 {
            return Err(ConfigError::ZeroValue("model.timeout_seconds"));
        }
        if self.sandbox.timeout_seconds == 0 {
            return Err(ConfigError::ZeroValue("sandbox.timeout_seconds"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroValue("retry.max_attempts"));
        }

        Ok(ModelSettings {
            id: required(&self.model.id, "model.id")?,
            base_url: required(&self.model.base_url, "model.base_url")?,
            api_key: required(&self.model.api_key, "model.api_key")?,
            timeout: Duration::from_secs(self.model.timeout_seconds),
        })
    }

    /// Execution parameters with the model's token cap applied
    pub fn execution_params(&self) -> ExecutionParams {
        let mut params = self.execution.clone();
        if self.model.max_tokens.is_some() {
            params.max_tokens = self.model.max_tokens;
        }
        params
    }

    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox.timeout_seconds)
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ConfigError::MissingSetting(name)),
    }
}
