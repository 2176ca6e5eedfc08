//! Application-level configuration.
//!
//! - [`ExecutionParams`]: loop control (iterations, agent steps, concurrency)
//! - [`RetryConfig`]: backoff policy around model calls

pub mod execution_params;
pub mod retry;

pub use execution_params::ExecutionParams;
pub use retry::RetryConfig;
