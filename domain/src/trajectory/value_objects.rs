//! Trajectory value objects: what the Executor reports and what the
//! Strategist answers.

use serde::{Deserialize, Serialize};

/// Outcome of executing one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub step_id: u32,
    pub success: bool,
    pub output: String,
    pub errors: Vec<String>,
}

impl ExecutionResult {
    pub fn success(step_id: u32, output: impl Into<String>) -> Self {
        Self {
            step_id,
            success: true,
            output: output.into(),
            errors: Vec::new(),
        }
    }

    pub fn failure(step_id: u32, error: impl Into<String>) -> Self {
        Self {
            step_id,
            success: false,
            output: String::new(),
            errors: vec![error.into()],
        }
    }
}

/// The Strategist's evaluation of a step result.
///
/// The decision text is advisory: the orchestration loop records it but does
/// not rewrite the trajectory from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategistEvaluation {
    pub step_id: u32,
    pub decision: String,
}

impl StrategistEvaluation {
    pub fn new(step_id: u32, decision: impl Into<String>) -> Self {
        Self {
            step_id,
            decision: decision.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_carries_error() {
        let result = ExecutionResult::failure(2, "sandbox denied write");
        assert!(!result.success);
        assert_eq!(result.errors, vec!["sandbox denied write"]);
        assert!(result.output.is_empty());
    }
}
