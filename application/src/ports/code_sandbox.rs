//! Code sandbox port
//!
//! Defines the interface for running agent-generated code under the
//! read-only capability filter.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use triad_domain::ExecutionCapabilities;

/// Errors raised by a sandbox session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SandboxError {
    /// The code attempted something the capability filter forbids
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Execution timed out after {0:?}")]
    Timeout(Duration),

    /// The interpreter died; the session must be reset before reuse
    #[error("Interpreter crashed: {0}")]
    Crashed(String),

    #[error("Sandbox unavailable: {0}")]
    Unavailable(String),

    #[error("Sandbox protocol error: {0}")]
    Protocol(String),
}

impl SandboxError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SandboxError::PermissionDenied(_))
    }

    /// Whether resetting the session is expected to recover it
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SandboxError::Timeout(_) | SandboxError::Crashed(_))
    }
}

/// Result of running one code block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeOutcome {
    /// Captured standard output
    pub output: String,
    /// Exception raised by the code, rendered as text
    pub error: Option<String>,
    /// Value passed to `final_answer`, if the code called it
    pub final_answer: Option<String>,
}

impl CodeOutcome {
    pub fn output(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn final_answer(answer: impl Into<String>) -> Self {
        Self {
            final_answer: Some(answer.into()),
            ..Default::default()
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Text fed back to the model after the run
    pub fn observation(&self) -> String {
        match &self.error {
            Some(error) if self.output.is_empty() => format!("Error:\n{error}"),
            Some(error) => format!("{}\nError:\n{error}", self.output),
            None if self.output.is_empty() => "(no output)".to_string(),
            None => self.output.clone(),
        }
    }
}

/// Factory for interpreter sessions
#[async_trait]
pub trait CodeSandbox: Send + Sync {
    /// Start a fresh interpreter session with no capabilities registered
    async fn start(&self) -> Result<Box<dyn SandboxSession>, SandboxError>;
}

/// A stateful interpreter session; variables persist between `execute` calls.
#[async_trait]
pub trait SandboxSession: Send {
    /// Install the restricted primitives. Must be called again after `reset`.
    async fn register_capabilities(
        &mut self,
        capabilities: &ExecutionCapabilities,
    ) -> Result<(), SandboxError>;

    /// Discard interpreter state, including registered capabilities
    async fn reset(&mut self) -> Result<(), SandboxError>;

    async fn execute(&mut self, code: &str) -> Result<CodeOutcome, SandboxError>;
}
