//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod answer_store;
pub mod code_sandbox;
pub mod directory_lister;
pub mod model_invoker;
pub mod progress;
pub mod role_agent;
