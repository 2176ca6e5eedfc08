//! Persisted answer records

use super::entities::{Task, TaskId};
use crate::scoring::question_scorer;
use serde::{Deserialize, Serialize};

/// One line of the answer log.
///
/// In evaluation mode (the task has ground truth) the record also carries the
/// reference answer, the score and the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub task_id: TaskId,
    pub agent_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl AnswerRecord {
    pub fn new(task_id: impl Into<TaskId>, agent_answer: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            agent_answer: agent_answer.into(),
            answer: None,
            score: None,
            level: None,
        }
    }

    /// Record for `task`, scored against its ground truth when it has one.
    pub fn for_task(task: &Task, agent_answer: impl Into<String>) -> Self {
        let mut record = Self::new(task.task_id.clone(), agent_answer);
        if let Some(reference) = &task.answer {
            record.score = Some(question_scorer(&record.agent_answer, reference));
            record.answer = Some(reference.clone());
            record.level = task.level.clone();
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_record_serializes_two_fields() {
        let record = AnswerRecord::new("5", "42");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"task_id": "5", "agent_answer": "42"}));
    }

    #[test]
    fn test_for_task_with_ground_truth_is_scored() {
        let task = Task::new("5", "How many?").with_ground_truth("1,000", "hard");
        let record = AnswerRecord::for_task(&task, "1000");
        assert_eq!(record.score, Some(true));
        assert_eq!(record.answer.as_deref(), Some("1,000"));
        assert_eq!(record.level.as_deref(), Some("hard"));
    }

    #[test]
    fn test_for_task_without_ground_truth() {
        let task = Task::new("5", "How many?");
        let record = AnswerRecord::for_task(&task, "1000");
        assert!(record.score.is_none());
        assert!(record.answer.is_none());
    }

    #[test]
    fn test_record_accepts_numeric_task_id() {
        let record: AnswerRecord =
            serde_json::from_str(r#"{"task_id": 5, "agent_answer": "x"}"#).unwrap();
        assert_eq!(record.task_id.as_str(), "5");
    }
}
