//! Role agent port
//!
//! A role agent answers one request in the voice of a role: ask the model,
//! optionally run sandboxed code, return text.

use super::code_sandbox::SandboxError;
use super::model_invoker::GatewayError;
use async_trait::async_trait;
use thiserror::Error;
use triad_domain::AgentRole;

/// Errors from a role agent run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentRunError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AgentRunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentRunError::Cancelled)
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AgentRunError::Sandbox(e) if e.is_permission_denied())
    }
}

/// Port for running a role
#[async_trait]
pub trait RoleAgent: Send + Sync {
    async fn run(&self, role: AgentRole, request: &str) -> Result<String, AgentRunError>;
}
