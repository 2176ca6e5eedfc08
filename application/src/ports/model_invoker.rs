//! Model invocation port
//!
//! Defines the interface for submitting a conversation to a language model.

use async_trait::async_trait;
use thiserror::Error;
use triad_domain::Message;

/// Errors that can occur during a model call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Upstream server error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Failure kinds expected to resolve on their own and eligible for retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout
                | GatewayError::RateLimited(_)
                | GatewayError::Connection(_)
                | GatewayError::Upstream { .. }
        )
    }
}

/// Port for model invocation
///
/// Implementations (adapters) live in the infrastructure layer; the retry
/// policy is applied around them by [`RetryingInvoker`](crate::use_cases::retrying_invoker::RetryingInvoker).
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Submit `messages` and return the completion text
    async fn invoke(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, GatewayError>;
}
