//! Answer store port
//!
//! The persisted answer log: append-only, one record per completed task,
//! read back to resume a run.

use std::collections::HashSet;
use thiserror::Error;
use triad_domain::{AnswerRecord, TaskId};

#[derive(Error, Debug)]
pub enum AnswerStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed answer record at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for answer persistence
///
/// `append` must write each record whole; concurrent appends never interleave.
pub trait AnswerStore: Send + Sync {
    /// Every record persisted so far, in write order
    fn load(&self) -> Result<Vec<AnswerRecord>, AnswerStoreError>;

    fn append(&self, record: &AnswerRecord) -> Result<(), AnswerStoreError>;

    /// Ids of tasks already answered
    fn completed_ids(&self) -> Result<HashSet<TaskId>, AnswerStoreError> {
        Ok(self.load()?.into_iter().map(|r| r.task_id).collect())
    }
}
