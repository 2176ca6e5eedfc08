//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod catalog_cache;
pub mod code_agent;
pub mod extract_knowledge;
pub mod retrying_invoker;
pub mod run_batch;
pub(crate) mod shared;
pub mod solve_task;
