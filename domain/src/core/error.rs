//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Trajectory has no step at index {index} (len {len})")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Trajectory is already terminal: {0}")]
    TrajectoryTerminal(String),
}
