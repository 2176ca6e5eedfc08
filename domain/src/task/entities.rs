//! Task entities

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a task in the dataset.
///
/// Datasets ship ids as numbers or strings; both normalize to the string form
/// so that `5` and `"5"` name the same task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(TaskId(s)),
            serde_json::Value::Number(n) => Ok(TaskId(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "task_id must be a string or number, got {other}"
            ))),
        }
    }
}

/// A data-analysis question (immutable input).
///
/// `answer` and `level` are only present for tasks with known ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub question: String,
    #[serde(default)]
    pub guidelines: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text_from_any")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "text_from_any")]
    pub level: Option<String>,
}

impl Task {
    pub fn new(task_id: impl Into<TaskId>, question: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            question: question.into(),
            guidelines: String::new(),
            answer: None,
            level: None,
        }
    }

    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    pub fn with_ground_truth(mut self, answer: impl Into<String>, level: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self.level = Some(level.into());
        self
    }

    /// Whether this task carries a ground-truth answer (evaluation mode)
    pub fn has_ground_truth(&self) -> bool {
        self.answer.is_some()
    }

    /// The text handed to the agents: question followed by answer guidelines.
    pub fn prompt_text(&self) -> String {
        if self.guidelines.trim().is_empty() {
            self.question.clone()
        } else {
            format!("{}\n\nGuidelines:\n{}", self.question, self.guidelines)
        }
    }
}

fn text_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
