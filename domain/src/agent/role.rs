//! Role agents
//!
//! The three cooperating roles are a closed set; each role carries its own
//! system prompt and its own reading of the model's final reply:
//!
//! | Role | Produces | Reply is read by |
//! |------|----------|------------------|
//! | Librarian | catalog, domain knowledge | [`parse_catalog`](crate::corpus::parse_catalog), [`DomainKnowledge::new`](crate::corpus::DomainKnowledge::new) |
//! | Strategist | trajectory, step evaluation | [`Trajectory::from_plan`](crate::trajectory::Trajectory::from_plan), [`StrategistEvaluation::new`](crate::trajectory::StrategistEvaluation::new) |
//! | Executor | step execution | [`ExecutionResult::success`](crate::trajectory::ExecutionResult::success) |

use super::capabilities::ExecutionCapabilities;
use super::mode::AgentMode;
use crate::prompt::RolePromptTemplate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Librarian,
    Strategist,
    Executor,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [
        AgentRole::Librarian,
        AgentRole::Strategist,
        AgentRole::Executor,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AgentRole::Librarian => "librarian",
            AgentRole::Strategist => "strategist",
            AgentRole::Executor => "executor",
        }
    }

    /// System prompt for this role, formatted for a corpus, a capability set
    /// and a prompting mode
    pub fn system_prompt(
        &self,
        corpus_path: &str,
        capabilities: &ExecutionCapabilities,
        mode: AgentMode,
    ) -> String {
        let imports = capabilities.imports_display();
        match self {
            AgentRole::Librarian => {
                RolePromptTemplate::librarian_system(corpus_path, &imports, mode)
            }
            AgentRole::Strategist => RolePromptTemplate::strategist_system(&imports, mode),
            AgentRole::Executor => RolePromptTemplate::executor_system(&imports, mode),
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_librarian_prompt_names_corpus() {
        let prompt = AgentRole::Librarian.system_prompt(
            "/data/context",
            &ExecutionCapabilities::read_only(),
            AgentMode::Chat,
        );
        assert!(prompt.contains("/data/context"));
        assert!(prompt.contains("pandas"));
    }

    #[test]
    fn test_every_role_gets_code_format() {
        let caps = ExecutionCapabilities::read_only();
        for role in AgentRole::ALL {
            for mode in [AgentMode::Chat, AgentMode::Reasoning] {
                let prompt = role.system_prompt("/data", &caps, mode);
                assert!(prompt.contains("<end_code>"), "{role} {mode}");
                assert!(prompt.contains("final_answer"), "{role} {mode}");
            }
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&AgentRole::Strategist).unwrap(),
            "\"strategist\""
        );
    }
}
