//! Progress notification port
//!
//! Defines the interface for reporting progress while tasks are solved.

use triad_domain::{TaskId, TrajectoryStatus};

/// Callback for progress updates during a batch or a single solve
///
/// Every method has a no-op default so implementations pick what they show.
pub trait SolveProgressNotifier: Send + Sync {
    /// Called before a task is handed to the orchestrator
    fn on_task_start(&self, _task_id: &TaskId, _index: usize, _total: usize) {}

    /// Called at the start of each plan/execute/evaluate iteration
    fn on_iteration(&self, _task_id: &TaskId, _iteration: usize, _max_iterations: usize) {}

    /// Called when a task finishes; `status` is `None` when the solve failed
    fn on_task_complete(&self, _task_id: &TaskId, _status: Option<TrajectoryStatus>) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl SolveProgressNotifier for NoProgress {}
