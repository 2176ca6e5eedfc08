//! Agent domain module
//!
//! The cooperating roles, how they are prompted and the capability filter
//! their code runs under.

pub mod capabilities;
pub mod mode;
pub mod role;

pub use capabilities::{
    AUTHORIZED_IMPORTS, BASE_IMPORTS, BLOCKED_OPERATIONS, CapabilityViolation,
    ExecutionCapabilities,
};
pub use mode::AgentMode;
pub use role::AgentRole;
