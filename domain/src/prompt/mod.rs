//! Prompt domain
//!
//! System prompts and per-request templates for each role.

mod role;

pub use role::RolePromptTemplate;
