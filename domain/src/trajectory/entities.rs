//! Trajectory entities and the status state machine

use crate::core::error::DomainError;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// Status of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TrajectoryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TrajectoryStatus::Pending => "pending",
            TrajectoryStatus::InProgress => "in_progress",
            TrajectoryStatus::Completed => "completed",
            TrajectoryStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TrajectoryStatus::Completed | TrajectoryStatus::Failed)
    }
}

impl std::fmt::Display for TrajectoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step of a trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: u32,
    pub action: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<u32>,
    #[serde(default)]
    pub validation_criteria: Vec<String>,
}

impl Step {
    pub fn new(step_id: u32, action: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step_id,
            action: action.into(),
            description: description.into(),
            expected_output: None,
            dependencies: Vec::new(),
            validation_criteria: Vec::new(),
        }
    }

    /// The step the Strategist's initial plan becomes.
    pub fn initial_plan(plan: impl Into<String>) -> Self {
        Self::new(1, "initial_plan", plan)
    }
}

/// Ordered execution plan for one task (Entity).
///
/// `current_step_index` never exceeds `steps.len()`; reaching equality
/// transitions the status to [`TrajectoryStatus::Completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub task_id: TaskId,
    steps: Vec<Step>,
    current_step_index: usize,
    status: TrajectoryStatus,
    pub context: serde_json::Value,
}

impl Trajectory {
    pub fn new(task_id: impl Into<TaskId>, steps: Vec<Step>, context: serde_json::Value) -> Self {
        Self {
            task_id: task_id.into(),
            steps,
            current_step_index: 0,
            status: TrajectoryStatus::Pending,
            context,
        }
    }

    /// Trajectory with the single step derived from the Strategist's plan.
    pub fn from_plan(
        task_id: impl Into<TaskId>,
        plan: impl Into<String>,
        context: serde_json::Value,
    ) -> Self {
        Self::new(task_id, vec![Step::initial_plan(plan)], context)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn status(&self) -> TrajectoryStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The step at the current index, if any remain
    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current_step_index)
    }

    /// Enter an iteration: returns the step to execute and moves a pending
    /// trajectory to `in_progress`.
    pub fn begin_step(&mut self) -> Result<Step, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::TrajectoryTerminal(self.status.to_string()));
        }
        let step = self
            .steps
            .get(self.current_step_index)
            .cloned()
            .ok_or(DomainError::StepOutOfRange {
                index: self.current_step_index,
                len: self.steps.len(),
            })?;
        self.status = TrajectoryStatus::InProgress;
        Ok(step)
    }

    /// Move past the current step. Completes the trajectory once every step
    /// has been visited. Terminal trajectories are left untouched.
    pub fn advance(&mut self) {
        if self.is_terminal() {
            return;
        }
        if self.current_step_index < self.steps.len() {
            self.current_step_index += 1;
        }
        if self.current_step_index >= self.steps.len() {
            self.status = TrajectoryStatus::Completed;
        }
    }

    /// Explicit Strategist-driven termination.
    pub fn fail(&mut self) {
        if !self.is_terminal() {
            self.status = TrajectoryStatus::Failed;
        }
    }

    /// Completion progress (visited / total)
    pub fn progress(&self) -> (usize, usize) {
        (self.current_step_index, self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_steps() -> Trajectory {
        Trajectory::new(
            "t1",
            vec![
                Step::new(1, "load", "Load payments"),
                Step::new(2, "filter", "Filter by merchant"),
                Step::new(3, "aggregate", "Sum fees"),
            ],
            serde_json::Value::Null,
        )
    }

    #[test]
    fn test_new_trajectory_is_pending() {
        let trajectory = three_steps();
        assert_eq!(trajectory.status(), TrajectoryStatus::Pending);
        assert_eq!(trajectory.current_step_index(), 0);
        assert_eq!(trajectory.current_step().unwrap().action, "load");
    }

    #[test]
    fn test_from_plan_has_single_initial_step() {
        let trajectory = Trajectory::from_plan("t1", "1. load 2. sum", serde_json::Value::Null);
        assert_eq!(trajectory.steps().len(), 1);
        assert_eq!(trajectory.steps()[0].action, "initial_plan");
        assert_eq!(trajectory.steps()[0].description, "1. load 2. sum");
    }

    #[test]
    fn test_begin_step_moves_to_in_progress() {
        let mut trajectory = three_steps();
        let step = trajectory.begin_step().unwrap();
        assert_eq!(step.step_id, 1);
        assert_eq!(trajectory.status(), TrajectoryStatus::InProgress);
    }

    #[test]
    fn test_advance_completes_at_end() {
        let mut trajectory = three_steps();
        for expected in 1..=3 {
            let step = trajectory.begin_step().unwrap();
            assert_eq!(step.step_id, expected);
            trajectory.advance();
        }
        assert_eq!(trajectory.status(), TrajectoryStatus::Completed);
        assert_eq!(trajectory.current_step_index(), 3);
        assert!(trajectory.current_step().is_none());
    }

    #[test]
    fn test_index_never_exceeds_len() {
        let mut trajectory = three_steps();
        for _ in 0..10 {
            trajectory.advance();
        }
        assert_eq!(trajectory.current_step_index(), 3);
        assert_eq!(trajectory.progress(), (3, 3));
    }

    #[test]
    fn test_begin_step_on_terminal_fails() {
        let mut trajectory = three_steps();
        trajectory.fail();
        assert!(matches!(
            trajectory.begin_step(),
            Err(DomainError::TrajectoryTerminal(_))
        ));
    }

    #[test]
    fn test_fail_is_sticky() {
        let mut trajectory = three_steps();
        trajectory.fail();
        trajectory.advance();
        assert_eq!(trajectory.status(), TrajectoryStatus::Failed);
        assert_eq!(trajectory.current_step_index(), 0);
    }

    #[test]
    fn test_empty_trajectory_cannot_begin() {
        let mut trajectory = Trajectory::new("t", vec![], serde_json::Value::Null);
        assert!(matches!(
            trajectory.begin_step(),
            Err(DomainError::StepOutOfRange { index: 0, len: 0 })
        ));
        trajectory.advance();
        assert_eq!(trajectory.status(), TrajectoryStatus::Completed);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TrajectoryStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
