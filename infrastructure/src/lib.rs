//! Infrastructure layer for triad
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod corpus;
pub mod providers;
pub mod sandbox;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileCorpusConfig, FileModelConfig, FileOutputConfig,
    FileSandboxConfig, ModelSettings,
};
pub use corpus::LocalDirectoryLister;
pub use providers::ChatCompletionsInvoker;
pub use sandbox::PythonSandbox;
pub use storage::{JsonlAnswerLog, TaskFileError, load_tasks};
