//! Retry decorator around a [`ModelInvoker`].

use crate::config::RetryConfig;
use crate::ports::model_invoker::{GatewayError, ModelInvoker};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;
use triad_domain::Message;

/// Wraps an invoker with the retry policy.
///
/// Transient failures are retried with backoff until the attempt ceiling;
/// anything else propagates on the first occurrence.
pub struct RetryingInvoker {
    inner: Arc<dyn ModelInvoker>,
    config: RetryConfig,
}

impl RetryingInvoker {
    pub fn new(inner: Arc<dyn ModelInvoker>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl ModelInvoker for RetryingInvoker {
    async fn invoke(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, GatewayError> {
        let mut attempt = 1;
        loop {
            match self.inner.invoke(messages, max_tokens).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && self.config.should_retry(attempt) => {
                    let delay = self.config.calculate_delay(attempt);
                    warn!(
                        "Model call failed (attempt {}/{}): {}; retrying in {:.1}s",
                        attempt,
                        self.config.max_attempts,
                        e,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!("Model call failed after {} attempts: {}", attempt, e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Invoker that replays scripted results and counts calls
    struct ScriptedInvoker {
        results: Mutex<VecDeque<Result<String, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedInvoker {
        fn new(results: Vec<Result<String, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn invoke(
            &self,
            _messages: &[Message],
            _max_tokens: Option<u32>,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::Timeout))
        }
    }

    fn messages() -> Vec<Message> {
        vec![Message::user("hello")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let inner = ScriptedInvoker::new(vec![
            Err(GatewayError::Timeout),
            Err(GatewayError::RateLimited("slow down".into())),
            Ok("done".into()),
        ]);
        let invoker = RetryingInvoker::new(inner.clone(), RetryConfig::default());

        let start = tokio::time::Instant::now();
        let text = invoker.invoke(&messages(), None).await.unwrap();

        assert_eq!(text, "done");
        assert_eq!(inner.calls(), 3);
        // 1s + 2s of backoff, plus at most 5s of jitter per retry
        let waited = start.elapsed();
        assert!(waited >= std::time::Duration::from_secs(3));
        assert!(waited <= std::time::Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_propagates_immediately() {
        let inner = ScriptedInvoker::new(vec![Err(GatewayError::InvalidRequest("bad".into()))]);
        let invoker = RetryingInvoker::new(inner.clone(), RetryConfig::default());

        let err = invoker.invoke(&messages(), None).await.unwrap_err();

        assert_eq!(err, GatewayError::InvalidRequest("bad".into()));
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_ceiling() {
        let inner = ScriptedInvoker::new(vec![]);
        let config = RetryConfig::default().with_max_attempts(4);
        let invoker = RetryingInvoker::new(inner.clone(), config);

        let err = invoker.invoke(&messages(), None).await.unwrap_err();

        assert_eq!(err, GatewayError::Timeout);
        assert_eq!(inner.calls(), 4);
    }
}
