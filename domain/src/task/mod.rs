//! Task domain module
//!
//! A [`Task`] is one data-analysis question posed against the evidence corpus;
//! an [`AnswerRecord`] is what a run persists for it.

pub mod answer;
pub mod entities;

pub use answer::AnswerRecord;
pub use entities::{Task, TaskId};
