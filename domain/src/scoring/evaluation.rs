//! Scoring a submitted answer set against tasks with ground truth

use crate::scoring::question_scorer;
use crate::task::{AnswerRecord, Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors from an evaluation pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Task ID: {0} not found. Are you sure you submitted the correct file?")]
    MissingTaskId(TaskId),
}

/// Score of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub task_id: TaskId,
    pub score: bool,
    pub level: String,
    pub agent_answer: String,
}

/// Score every ground-truth task against the submitted answers, in task order.
///
/// Tasks without ground truth are skipped. When a task id appears more than
/// once in `answers` the first record wins. Fails on the first task whose id
/// has no answer.
pub fn evaluate(
    answers: &[AnswerRecord],
    tasks: &[Task],
) -> Result<Vec<ScoreResult>, EvaluationError> {
    let mut by_id: HashMap<&TaskId, &str> = HashMap::with_capacity(answers.len());
    for record in answers {
        by_id.entry(&record.task_id).or_insert(&record.agent_answer);
    }

    tasks
        .iter()
        .filter_map(|task| task.answer.as_deref().map(|reference| (task, reference)))
        .map(|(task, reference)| -> Result<ScoreResult, EvaluationError> {
            let agent_answer = by_id
                .get(&task.task_id)
                .ok_or_else(|| EvaluationError::MissingTaskId(task.task_id.clone()))?;
            Ok(ScoreResult {
                task_id: task.task_id.clone(),
                score: question_scorer(agent_answer, reference),
                level: task.level.clone().unwrap_or_default(),
                agent_answer: agent_answer.to_string(),
            })
        })
        .collect()
}

/// Accuracy of one difficulty level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelAccuracy {
    pub level: String,
    pub correct: usize,
    pub total: usize,
}

impl LevelAccuracy {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Per-level accuracy, sorted by level name
pub fn accuracy_by_level(results: &[ScoreResult]) -> Vec<LevelAccuracy> {
    let mut levels: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for result in results {
        let (correct, total) = levels.entry(result.level.as_str()).or_default();
        *total += 1;
        if result.score {
            *correct += 1;
        }
    }

    levels
        .into_iter()
        .map(|(level, (correct, total))| LevelAccuracy {
            level: level.to_string(),
            correct,
            total,
        })
        .collect()
}
