//! Execution parameters: solve loop control.
//!
//! [`ExecutionParams`] groups the static parameters that bound the
//! orchestration loop, the per-role code loop and the batch worker pool.
//! These are application-layer concerns, not domain policy.

use serde::{Deserialize, Serialize};
use triad_domain::AgentMode;

/// Loop control parameters.
///
/// | Field | Bounds |
/// |-------|--------|
/// | `max_iterations` | plan/execute/evaluate iterations per task |
/// | `max_agent_steps` | model turns per role-agent run |
/// | `concurrency` | tasks solved at once by the batch runner |
///
/// `agent_mode` picks the prompt style of every role agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    pub max_iterations: usize,
    pub max_agent_steps: usize,
    pub concurrency: usize,
    /// Token cap per completion (`None` lets the provider decide)
    pub max_tokens: Option<u32>,
    pub agent_mode: AgentMode,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            max_agent_steps: 10,
            concurrency: 1,
            max_tokens: Some(3000),
            agent_mode: AgentMode::Chat,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_agent_steps(mut self, max: usize) -> Self {
        self.max_agent_steps = max;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_agent_mode(mut self, mode: AgentMode) -> Self {
        self.agent_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_iterations, 10);
        assert_eq!(params.max_agent_steps, 10);
        assert_eq!(params.concurrency, 1);
        assert_eq!(params.max_tokens, Some(3000));
        assert_eq!(params.agent_mode, AgentMode::Chat);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_max_iterations(3)
            .with_max_agent_steps(5)
            .with_concurrency(0)
            .with_agent_mode(AgentMode::Reasoning);

        assert_eq!(params.agent_mode, AgentMode::Reasoning);
        assert_eq!(params.max_iterations, 3);
        assert_eq!(params.max_agent_steps, 5);
        assert_eq!(params.concurrency, 1);
    }
}
