//! Solve Task use case
//!
//! The orchestrator owns the shared state of a corpus (catalog cache and the
//! per-task domain knowledge map) and drives one task through:
//!
//! ```text
//! catalog (cached) ─▶ domain knowledge ─▶ initial trajectory
//!        ─▶ loop { execute step ─▶ evaluate ─▶ advance }
//! ```
//!
//! The loop halts on a terminal trajectory status or after `max_iterations`,
//! whichever comes first. The Strategist's evaluation is recorded but does
//! not rewrite the trajectory.

use super::catalog_cache::CatalogCache;
use super::extract_knowledge::KnowledgeExtractor;
use super::shared::{is_cancelled, run_cancellable};
use crate::ports::directory_lister::DirectoryLister;
use crate::ports::progress::{NoProgress, SolveProgressNotifier};
use crate::ports::role_agent::{AgentRunError, RoleAgent};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use triad_domain::{
    AgentRole, Catalog, DomainError, DomainKnowledge, ExecutionResult, RolePromptTemplate,
    StrategistEvaluation, Task, Trajectory, TrajectoryStatus,
};

/// Errors that abort a solve
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("{role} agent failed: {source}")]
    Agent {
        role: AgentRole,
        #[source]
        source: AgentRunError,
    },

    #[error("Trajectory error: {0}")]
    Trajectory(#[from] DomainError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl SolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SolveError::Cancelled)
    }

    fn agent(role: AgentRole, source: AgentRunError) -> Self {
        if source.is_cancelled() {
            SolveError::Cancelled
        } else {
            SolveError::Agent { role, source }
        }
    }
}

/// What one pass of the iteration loop produced
#[derive(Debug, Clone, Default)]
pub struct LoopOutcome {
    pub iterations_run: usize,
    pub execution_results: Vec<ExecutionResult>,
    pub evaluations: Vec<StrategistEvaluation>,
}

impl LoopOutcome {
    /// Output of the last successful step, or empty when none succeeded
    pub fn answer(&self) -> String {
        self.execution_results
            .iter()
            .rev()
            .find(|r| r.success)
            .map(|r| r.output.clone())
            .unwrap_or_default()
    }
}

/// Result of solving one task
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub task: Task,
    pub status: TrajectoryStatus,
    pub iterations_run: usize,
    pub trajectory: Trajectory,
    pub knowledge: DomainKnowledge,
    pub execution_results: Vec<ExecutionResult>,
    pub evaluations: Vec<StrategistEvaluation>,
    pub answer: String,
}

/// Multi-role orchestrator for one corpus path
pub struct Orchestrator {
    agent: Arc<dyn RoleAgent>,
    catalogs: Arc<CatalogCache>,
    knowledge: KnowledgeExtractor,
    corpus_path: PathBuf,
    domain_knowledge: Mutex<HashMap<String, DomainKnowledge>>,
    cancellation_token: Option<CancellationToken>,
}

impl Orchestrator {
    pub fn new(
        agent: Arc<dyn RoleAgent>,
        lister: Arc<dyn DirectoryLister>,
        corpus_path: impl Into<PathBuf>,
    ) -> Self {
        let catalogs = Arc::new(CatalogCache::new(Arc::clone(&agent), Arc::clone(&lister)));
        let knowledge = KnowledgeExtractor::new(Arc::clone(&agent), lister, Arc::clone(&catalogs));
        Self {
            agent,
            catalogs,
            knowledge,
            corpus_path: corpus_path.into(),
            domain_knowledge: Mutex::new(HashMap::new()),
            cancellation_token: None,
        }
    }

    /// Set a cancellation token; every role-agent call is raced against it
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// The cached catalog of this orchestrator's corpus, if built
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.catalogs.get(&self.corpus_path)
    }

    /// Knowledge extracted for a task text
    pub fn domain_knowledge(&self, task_text: &str) -> Option<DomainKnowledge> {
        self.knowledge_map().get(task_text).cloned()
    }

    fn knowledge_map(&self) -> std::sync::MutexGuard<'_, HashMap<String, DomainKnowledge>> {
        self.domain_knowledge
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Solve with default (no-op) progress
    pub async fn solve(&self, task: &Task, max_iterations: usize) -> Result<TaskResult, SolveError> {
        self.solve_with_progress(task, max_iterations, &NoProgress).await
    }

    /// Solve with progress callbacks
    pub async fn solve_with_progress(
        &self,
        task: &Task,
        max_iterations: usize,
        progress: &dyn SolveProgressNotifier,
    ) -> Result<TaskResult, SolveError> {
        let task_text = task.prompt_text();
        info!("Solving task {}", task.task_id);

        // Catalog: built once per corpus path, reused afterwards
        let catalog = self
            .cancellable(self.catalogs.get_or_build(&self.corpus_path, false))
            .await?
            .map_err(|e| SolveError::agent(AgentRole::Librarian, e))?;

        let knowledge = self
            .cancellable(self.knowledge.extract(
                &task_text,
                &self.corpus_path,
                Some(Arc::clone(&catalog)),
            ))
            .await?
            .map_err(|e| SolveError::agent(AgentRole::Librarian, e))?;
        self.knowledge_map()
            .insert(task_text.clone(), knowledge.clone());

        let findings = json!({
            "data_catalog": &*catalog,
            "domain_knowledge": &knowledge,
            "task": &task_text,
        });

        info!("Strategist creating trajectory for task {}", task.task_id);
        let plan = self
            .run_role(
                AgentRole::Strategist,
                RolePromptTemplate::create_trajectory_request(&task_text, &findings),
            )
            .await?;
        let mut trajectory = Trajectory::from_plan(
            task.task_id.clone(),
            plan,
            json!({ "librarian_findings": findings }),
        );

        let outcome = self
            .drive(&mut trajectory, max_iterations, progress)
            .await?;

        info!(
            "Task {} finished: {} after {} iterations",
            task.task_id,
            trajectory.status(),
            outcome.iterations_run
        );

        Ok(TaskResult {
            task: task.clone(),
            status: trajectory.status(),
            iterations_run: outcome.iterations_run,
            answer: outcome.answer(),
            trajectory,
            knowledge,
            execution_results: outcome.execution_results,
            evaluations: outcome.evaluations,
        })
    }

    /// Run the plan/execute/evaluate loop over an existing trajectory.
    ///
    /// Each iteration executes the current step, has the Strategist evaluate
    /// the result, then advances unconditionally. Stops on a terminal status
    /// or once `max_iterations` iterations have run; the trajectory keeps
    /// whatever status it had at the cutoff.
    pub async fn drive(
        &self,
        trajectory: &mut Trajectory,
        max_iterations: usize,
        progress: &dyn SolveProgressNotifier,
    ) -> Result<LoopOutcome, SolveError> {
        let mut outcome = LoopOutcome::default();

        while outcome.iterations_run < max_iterations && !trajectory.is_terminal() {
            if is_cancelled(&self.cancellation_token) {
                return Err(SolveError::Cancelled);
            }
            outcome.iterations_run += 1;
            progress.on_iteration(&trajectory.task_id, outcome.iterations_run, max_iterations);

            let step = trajectory.begin_step()?;
            debug!(
                "Iteration {}: executing step {} ({})",
                outcome.iterations_run, step.step_id, step.action
            );

            let request = RolePromptTemplate::execute_step_request(&step, &trajectory.context);
            let result = match self
                .cancellable(self.agent.run(AgentRole::Executor, &request))
                .await?
            {
                Ok(output) => ExecutionResult::success(step.step_id, output),
                Err(e) if e.is_permission_denied() => {
                    warn!("Step {} violated the sandbox policy: {}", step.step_id, e);
                    ExecutionResult::failure(step.step_id, e.to_string())
                }
                Err(e) => return Err(SolveError::agent(AgentRole::Executor, e)),
            };

            let decision = self
                .run_role(
                    AgentRole::Strategist,
                    RolePromptTemplate::evaluate_request(trajectory, &result),
                )
                .await?;
            outcome
                .evaluations
                .push(StrategistEvaluation::new(step.step_id, decision));
            outcome.execution_results.push(result);

            trajectory.advance();
        }

        Ok(outcome)
    }

    async fn run_role(&self, role: AgentRole, request: String) -> Result<String, SolveError> {
        self.cancellable(self.agent.run(role, &request))
            .await?
            .map_err(|e| SolveError::agent(role, e))
    }

    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output, SolveError> {
        if is_cancelled(&self.cancellation_token) {
            return Err(SolveError::Cancelled);
        }
        run_cancellable(&self.cancellation_token, future)
            .await
            .ok_or(SolveError::Cancelled)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::code_sandbox::SandboxError;
    use crate::ports::model_invoker::GatewayError;
    use crate::use_cases::catalog_cache::tests::{CATALOG_REPLY, FixedLister};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triad_domain::Step;

    /// Role agent with per-role canned replies and call counters.
    ///
    /// Executor replies echo the step description so tests can see which
    /// step ran.
    pub(crate) struct FakeAgents {
        pub(crate) catalog_builds: AtomicUsize,
        pub(crate) knowledge_calls: AtomicUsize,
        pub(crate) strategist_calls: AtomicUsize,
        pub(crate) executed: Mutex<Vec<String>>,
        pub(crate) executor_error: Mutex<Option<AgentRunError>>,
        pub(crate) delay: std::time::Duration,
    }

    impl FakeAgents {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::with_delay(std::time::Duration::ZERO))
        }

        pub(crate) fn with_delay(delay: std::time::Duration) -> Self {
            Self {
                catalog_builds: AtomicUsize::new(0),
                knowledge_calls: AtomicUsize::new(0),
                strategist_calls: AtomicUsize::new(0),
                executed: Mutex::new(Vec::new()),
                executor_error: Mutex::new(None),
                delay,
            }
        }
    }

    #[async_trait]
    impl RoleAgent for FakeAgents {
        async fn run(&self, role: AgentRole, request: &str) -> Result<String, AgentRunError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match role {
                AgentRole::Librarian if request.starts_with("You are cataloging") => {
                    self.catalog_builds.fetch_add(1, Ordering::SeqCst);
                    Ok(CATALOG_REPLY.to_string())
                }
                AgentRole::Librarian => {
                    self.knowledge_calls.fetch_add(1, Ordering::SeqCst);
                    Ok("manual.md says fees are per transaction".to_string())
                }
                AgentRole::Strategist => {
                    self.strategist_calls.fetch_add(1, Ordering::SeqCst);
                    Ok("1. load payments 2. sum fees".to_string())
                }
                AgentRole::Executor => {
                    if let Some(e) = self.executor_error.lock().unwrap().clone() {
                        return Err(e);
                    }
                    let step: Step = serde_json::from_str(
                        request
                            .split("Instructions:\n")
                            .nth(1)
                            .and_then(|rest| rest.split("\n\nContext:").next())
                            .unwrap_or("{}"),
                    )
                    .map_err(|e| AgentRunError::Gateway(GatewayError::Other(e.to_string())))?;
                    self.executed.lock().unwrap().push(step.description.clone());
                    Ok(format!("answer for {}", step.description))
                }
            }
        }
    }

    fn orchestrator(agents: Arc<FakeAgents>) -> Orchestrator {
        Orchestrator::new(agents, Arc::new(FixedLister { exists: true }), "/corpus")
    }

    fn k_steps(k: u32) -> Trajectory {
        Trajectory::new(
            "t",
            (1..=k).map(|i| Step::new(i, "run", format!("step {i}"))).collect(),
            serde_json::Value::Null,
        )
    }

    #[tokio::test]
    async fn test_solve_runs_full_pipeline() {
        let agents = FakeAgents::new();
        let orchestrator = orchestrator(agents.clone());
        let task = Task::new("5", "What is the total fee?");

        let result = orchestrator.solve(&task, 10).await.unwrap();

        assert_eq!(result.status, TrajectoryStatus::Completed);
        assert_eq!(result.iterations_run, 1);
        assert_eq!(result.trajectory.steps()[0].action, "initial_plan");
        assert_eq!(result.answer, "answer for 1. load payments 2. sum fees");
        assert_eq!(result.evaluations.len(), 1);
        // create trajectory + one evaluation
        assert_eq!(agents.strategist_calls.load(Ordering::SeqCst), 2);
        assert!(orchestrator.catalog().is_some());
        assert!(orchestrator.domain_knowledge("What is the total fee?").is_some());
    }

    #[tokio::test]
    async fn test_catalog_built_once_across_tasks() {
        let agents = FakeAgents::new();
        let orchestrator = orchestrator(agents.clone());

        orchestrator.solve(&Task::new("1", "q1"), 10).await.unwrap();
        orchestrator.solve(&Task::new("2", "q2"), 10).await.unwrap();

        assert_eq!(agents.catalog_builds.load(Ordering::SeqCst), 1);
        assert_eq!(agents.knowledge_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_solves_build_catalog_once() {
        let agents = Arc::new(FakeAgents::with_delay(std::time::Duration::from_millis(10)));
        let orchestrator = Arc::new(orchestrator(agents.clone()));

        let mut join_set = tokio::task::JoinSet::new();
        for i in 0..6 {
            let orchestrator = Arc::clone(&orchestrator);
            join_set.spawn(async move {
                orchestrator
                    .solve(&Task::new(i.to_string(), format!("question {i}")), 3)
                    .await
            });
        }
        while let Some(result) = join_set.join_next().await {
            assert!(result.unwrap().is_ok());
        }

        assert_eq!(agents.catalog_builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_k_steps_complete_in_k_iterations() {
        let agents = FakeAgents::new();
        let orchestrator = orchestrator(agents.clone());
        let mut trajectory = k_steps(4);

        let outcome = orchestrator
            .drive(&mut trajectory, 10, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome.iterations_run, 4);
        assert_eq!(trajectory.status(), TrajectoryStatus::Completed);
        assert_eq!(
            *agents.executed.lock().unwrap(),
            vec!["step 1", "step 2", "step 3", "step 4"]
        );
        assert_eq!(outcome.answer(), "answer for step 4");
    }

    #[tokio::test]
    async fn test_iteration_bound_cuts_off() {
        let agents = FakeAgents::new();
        let orchestrator = orchestrator(agents.clone());
        let mut trajectory = k_steps(5);

        let outcome = orchestrator
            .drive(&mut trajectory, 2, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome.iterations_run, 2);
        assert_eq!(trajectory.status(), TrajectoryStatus::InProgress);
        assert_eq!(trajectory.current_step_index(), 2);
        assert_eq!(agents.executed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_iterations_leaves_trajectory_pending() {
        let orchestrator = orchestrator(FakeAgents::new());
        let mut trajectory = k_steps(1);

        let outcome = orchestrator
            .drive(&mut trajectory, 0, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome.iterations_run, 0);
        assert_eq!(trajectory.status(), TrajectoryStatus::Pending);
        assert_eq!(outcome.answer(), "");
    }

    #[tokio::test]
    async fn test_failed_trajectory_is_not_executed() {
        let agents = FakeAgents::new();
        let orchestrator = orchestrator(agents.clone());
        let mut trajectory = k_steps(2);
        trajectory.fail();

        let outcome = orchestrator
            .drive(&mut trajectory, 10, &NoProgress)
            .await
            .unwrap();

        assert_eq!(outcome.iterations_run, 0);
        assert!(agents.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permission_denied_becomes_failed_step() {
        let agents = FakeAgents::new();
        *agents.executor_error.lock().unwrap() = Some(AgentRunError::Sandbox(
            SandboxError::PermissionDenied("Only read mode".into()),
        ));
        let orchestrator = orchestrator(agents.clone());
        let mut trajectory = k_steps(1);

        let outcome = orchestrator
            .drive(&mut trajectory, 10, &NoProgress)
            .await
            .unwrap();

        assert!(!outcome.execution_results[0].success);
        assert!(outcome.execution_results[0].errors[0].contains("Permission denied"));
        assert_eq!(outcome.answer(), "");
        // the loop still advances past the failed step
        assert_eq!(trajectory.status(), TrajectoryStatus::Completed);
    }

    #[tokio::test]
    async fn test_executor_gateway_failure_aborts_solve() {
        let agents = FakeAgents::new();
        *agents.executor_error.lock().unwrap() =
            Some(AgentRunError::Gateway(GatewayError::Timeout));
        let orchestrator = orchestrator(agents);

        let err = orchestrator
            .solve(&Task::new("1", "q"), 10)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SolveError::Agent {
                role: AgentRole::Executor,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let agents = FakeAgents::new();
        let token = CancellationToken::new();
        token.cancel();
        let orchestrator = orchestrator(agents.clone()).with_cancellation(token);

        let err = orchestrator.solve(&Task::new("1", "q"), 10).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(agents.catalog_builds.load(Ordering::SeqCst), 0);
        assert!(orchestrator.catalog().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_in_flight_call() {
        let agents = Arc::new(FakeAgents::with_delay(std::time::Duration::from_secs(60)));
        let token = CancellationToken::new();
        let orchestrator = orchestrator(agents.clone()).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            token.cancel();
        });
        let err = orchestrator.solve(&Task::new("1", "q"), 10).await.unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
        // the catalog build was abandoned mid-flight, nothing stored
        assert!(orchestrator.catalog().is_none());
    }
}
