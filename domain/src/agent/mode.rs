//! Prompting style of the role agents

use serde::{Deserialize, Serialize};

/// Model-id fragments of reasoning-model families
const REASONING_MARKERS: &[&str] = &["o1", "o3", "o4", "r1", "reasoner", "thinking", "qwq"];

/// How a role agent is prompted.
///
/// Chat models get an explicit `Thought:`/`Code:` scaffold. Reasoning models
/// plan internally and are asked for the code block alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    Reasoning,
    #[default]
    Chat,
}

impl AgentMode {
    pub fn as_str(&self) -> &str {
        match self {
            AgentMode::Reasoning => "reasoning",
            AgentMode::Chat => "chat",
        }
    }

    /// Whether `model_id` names a reasoning model, judged by its family markers
    pub fn is_reasoning_model(model_id: &str) -> bool {
        let id = model_id.to_ascii_lowercase();
        let name = id.rsplit('/').next().unwrap_or(&id);
        name.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|part| REASONING_MARKERS.contains(&part))
            || REASONING_MARKERS[4..].iter().any(|m| name.contains(m))
    }

    /// Whether this mode suits `model_id`
    pub fn suits_model(&self, model_id: &str) -> bool {
        match self {
            AgentMode::Reasoning => Self::is_reasoning_model(model_id),
            AgentMode::Chat => !Self::is_reasoning_model(model_id),
        }
    }
}

impl std::str::FromStr for AgentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reasoning" => Ok(AgentMode::Reasoning),
            "chat" => Ok(AgentMode::Chat),
            other => Err(format!("unknown agent mode '{other}' (expected reasoning or chat)")),
        }
    }
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_model_detection() {
        assert!(AgentMode::is_reasoning_model("o3-mini"));
        assert!(AgentMode::is_reasoning_model("openai/o1"));
        assert!(AgentMode::is_reasoning_model("deepseek-r1-distill-llama-70b"));
        assert!(AgentMode::is_reasoning_model("deepseek-reasoner"));
        assert!(AgentMode::is_reasoning_model("Qwen/QwQ-32B"));
        assert!(!AgentMode::is_reasoning_model("gpt-4o"));
        assert!(!AgentMode::is_reasoning_model("meta-llama/Llama-3.3-70B-Instruct"));
        assert!(!AgentMode::is_reasoning_model("deepseek-v3"));
    }

    #[test]
    fn test_suits_model() {
        assert!(AgentMode::Reasoning.suits_model("o3-mini"));
        assert!(!AgentMode::Reasoning.suits_model("gpt-4o"));
        assert!(AgentMode::Chat.suits_model("gpt-4o"));
        assert!(!AgentMode::Chat.suits_model("deepseek-r1"));
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!("Reasoning".parse::<AgentMode>(), Ok(AgentMode::Reasoning));
        assert!("fast".parse::<AgentMode>().is_err());
        assert_eq!(serde_json::to_string(&AgentMode::Chat).unwrap(), "\"chat\"");
        assert_eq!(AgentMode::default(), AgentMode::Chat);
    }
}
