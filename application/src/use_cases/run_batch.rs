//! Run Batch use case
//!
//! The task runner: selects tasks, skips the ones already present in the
//! answer log, solves the rest sequentially or in a bounded worker pool, and
//! appends one answer record per solved task.

use super::solve_task::{Orchestrator, SolveError};
use crate::ports::answer_store::{AnswerStore, AnswerStoreError};
use crate::ports::progress::{NoProgress, SolveProgressNotifier};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use triad_domain::{AnswerRecord, Task, TaskId};

/// Errors that abort a whole batch
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("task_ids and max_tasks cannot be combined")]
    ConflictingFilters,

    #[error("Answer store error: {0}")]
    Store(#[from] AnswerStoreError),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Input for the RunBatch use case
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub tasks: Vec<Task>,
    /// Only run these ids
    pub task_ids: Option<HashSet<TaskId>>,
    /// Only run the first `n` tasks
    pub max_tasks: Option<usize>,
    pub max_iterations: usize,
    pub concurrency: usize,
}

impl BatchInput {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            task_ids: None,
            max_tasks: None,
            max_iterations: 10,
            concurrency: 1,
        }
    }

    pub fn with_task_ids(mut self, ids: impl IntoIterator<Item = TaskId>) -> Self {
        self.task_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = Some(max);
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Counts for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: usize,
    pub skipped: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Use case for running a batch of tasks against one orchestrator
pub struct RunBatchUseCase {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn AnswerStore>,
    progress: Arc<dyn SolveProgressNotifier>,
}

impl RunBatchUseCase {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<dyn AnswerStore>) -> Self {
        Self {
            orchestrator,
            store,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn SolveProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub async fn execute(&self, input: BatchInput) -> Result<BatchSummary, BatchError> {
        let selected = select_tasks(&input)?;
        let completed = self.store.completed_ids()?;

        let (done, pending): (Vec<Task>, Vec<Task>) = selected
            .into_iter()
            .partition(|task| completed.contains(&task.task_id));
        for task in &done {
            info!("Skipping task {}: already answered", task.task_id);
        }

        let mut summary = BatchSummary {
            attempted: pending.len(),
            skipped: done.len(),
            ..Default::default()
        };
        info!(
            "Running {} tasks ({} already answered, concurrency {})",
            summary.attempted, summary.skipped, input.concurrency
        );

        if input.concurrency <= 1 {
            let total = pending.len();
            for (index, task) in pending.into_iter().enumerate() {
                self.progress.on_task_start(&task.task_id, index, total);
                let solved = solve_and_record(
                    &self.orchestrator,
                    self.store.as_ref(),
                    self.progress.as_ref(),
                    &task,
                    input.max_iterations,
                )
                .await?;
                tally(&mut summary, solved);
            }
        } else {
            self.run_pool(pending, &input, &mut summary).await?;
        }

        info!(
            "Batch finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped
        );
        Ok(summary)
    }

    async fn run_pool(
        &self,
        pending: Vec<Task>,
        input: &BatchInput,
        summary: &mut BatchSummary,
    ) -> Result<(), BatchError> {
        let semaphore = Arc::new(Semaphore::new(input.concurrency));
        let total = pending.len();
        let mut join_set = JoinSet::new();

        for (index, task) in pending.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let orchestrator = Arc::clone(&self.orchestrator);
            let store = Arc::clone(&self.store);
            let progress = Arc::clone(&self.progress);
            let max_iterations = input.max_iterations;

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return Err(BatchError::Cancelled);
                };
                progress.on_task_start(&task.task_id, index, total);
                solve_and_record(
                    &orchestrator,
                    store.as_ref(),
                    progress.as_ref(),
                    &task,
                    max_iterations,
                )
                .await
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Ok(solved)) => tally(summary, solved),
                Ok(Err(e)) => {
                    join_set.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    warn!("Task worker panicked: {}", e);
                    summary.failed += 1;
                }
            }
        }
        Ok(())
    }
}

fn select_tasks(input: &BatchInput) -> Result<Vec<Task>, BatchError> {
    match (&input.task_ids, input.max_tasks) {
        (Some(_), Some(_)) => Err(BatchError::ConflictingFilters),
        (Some(ids), None) => Ok(input
            .tasks
            .iter()
            .filter(|task| ids.contains(&task.task_id))
            .cloned()
            .collect()),
        (None, Some(max)) => Ok(input.tasks.iter().take(max).cloned().collect()),
        (None, None) => Ok(input.tasks.clone()),
    }
}

fn tally(summary: &mut BatchSummary, solved: bool) {
    if solved {
        summary.succeeded += 1;
    } else {
        summary.failed += 1;
    }
}

/// Solve one task and persist its answer. `Ok(false)` is a task failure the
/// batch survives; `Err` aborts the batch.
async fn solve_and_record(
    orchestrator: &Orchestrator,
    store: &dyn AnswerStore,
    progress: &dyn SolveProgressNotifier,
    task: &Task,
    max_iterations: usize,
) -> Result<bool, BatchError> {
    match orchestrator
        .solve_with_progress(task, max_iterations, progress)
        .await
    {
        Ok(result) => {
            store.append(&AnswerRecord::for_task(task, result.answer))?;
            progress.on_task_complete(&task.task_id, Some(result.status));
            Ok(true)
        }
        Err(SolveError::Cancelled) => Err(BatchError::Cancelled),
        Err(e) => {
            warn!("Task {} failed: {}", task.task_id, e);
            progress.on_task_complete(&task.task_id, None);
            Ok(false)
        }
    }
}
