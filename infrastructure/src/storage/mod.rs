//! File-backed persistence: the JSONL answer log and task files

mod answer_log;
mod task_file;

pub use answer_log::JsonlAnswerLog;
pub use task_file::{TaskFileError, load_tasks};
