//! Domain layer for triad
//!
//! This crate contains the core logic, entities, and value objects.
//! It has no dependencies on infrastructure or I/O.
//!
//! # Core Concepts
//!
//! ## Roles
//!
//! Three cooperating roles solve a data-analysis question over a corpus:
//!
//! - **Librarian**: catalogs the corpus once and extracts query-specific knowledge
//! - **Strategist**: turns the findings into a [`Trajectory`] and judges each step
//! - **Executor**: carries out one trajectory step at a time
//!
//! ## Scoring
//!
//! [`question_scorer`] decides whether an answer matches the ground truth
//! under numeric, list and fuzzy-text semantics.

pub mod agent;
pub mod core;
pub mod corpus;
pub mod prompt;
pub mod scoring;
pub mod session;
pub mod task;
pub mod trajectory;

// Re-export commonly used types
pub use agent::{AgentMode, AgentRole, CapabilityViolation, ExecutionCapabilities};
pub use core::error::DomainError;
pub use corpus::{
    Catalog, CatalogStatus, DirectoryListing, DomainKnowledge, FileCategory, FileEntry,
    KnowledgeStatus, ListedDirectory, ListedFile, parse_catalog,
};
pub use prompt::RolePromptTemplate;
pub use scoring::{
    EvaluationError, LevelAccuracy, ScoreResult, accuracy_by_level, evaluate, question_scorer,
};
pub use session::entities::{Message, Role};
pub use task::{AnswerRecord, Task, TaskId};
pub use trajectory::{
    ExecutionResult, Step, StrategistEvaluation, Trajectory, TrajectoryStatus,
};
