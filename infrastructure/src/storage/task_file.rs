//! Task file loading.
//!
//! Tasks ship as JSON Lines: `{task_id, question, guidelines, answer?, level?}`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use triad_domain::Task;

#[derive(Error, Debug)]
pub enum TaskFileError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed task at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Load every task from a JSONL file, skipping blank lines.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, TaskFileError> {
    let io_error = |source| TaskFileError::Io {
        path: path.display().to_string(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut tasks = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let task: Task = serde_json::from_str(&line).map_err(|e| TaskFileError::Malformed {
            line: index + 1,
            message: e.to_string(),
        })?;
        tasks.push(task);
    }

    info!("Loaded {} tasks from {}", tasks.len(), path.display());
    Ok(tasks)
}
