//! Trajectory domain module
//!
//! A [`Trajectory`] is the Strategist's ordered, mutable plan for one task,
//! walked step by step by the orchestration loop:
//!
//! ```text
//! pending ──(first iteration)──▶ in_progress ──(index == len)──▶ completed
//!                                      │
//!                                      └──(explicit fail)──▶ failed
//! ```

pub mod entities;
pub mod value_objects;

pub use entities::{Step, Trajectory, TrajectoryStatus};
pub use value_objects::{ExecutionResult, StrategistEvaluation};
