//! Answer scoring
//!
//! Decides whether a free-text agent answer matches a free-text ground-truth
//! answer, and scores a whole answer set against a task set.

pub mod evaluation;
pub mod scorer;
mod sequence_matcher;

pub use evaluation::{EvaluationError, LevelAccuracy, ScoreResult, accuracy_by_level, evaluate};
pub use scorer::question_scorer;
pub use sequence_matcher::similarity_ratio;
