//! Application layer for triad
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ExecutionParams, RetryConfig};
pub use ports::{
    answer_store::{AnswerStore, AnswerStoreError},
    code_sandbox::{CodeOutcome, CodeSandbox, SandboxError, SandboxSession},
    directory_lister::DirectoryLister,
    model_invoker::{GatewayError, ModelInvoker},
    progress::{NoProgress, SolveProgressNotifier},
    role_agent::{AgentRunError, RoleAgent},
};
pub use use_cases::catalog_cache::CatalogCache;
pub use use_cases::code_agent::CodeAgent;
pub use use_cases::extract_knowledge::KnowledgeExtractor;
pub use use_cases::retrying_invoker::RetryingInvoker;
pub use use_cases::run_batch::{BatchError, BatchInput, BatchSummary, RunBatchUseCase};
pub use use_cases::solve_task::{LoopOutcome, Orchestrator, SolveError, TaskResult};
