//! Shared utilities for use cases.
//!
//! Cancellation checking and racing used by the orchestrator and the batch
//! runner.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Returns true if the token exists and is cancelled.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(|t| t.is_cancelled())
}

/// Race `future` against the token. `None` means cancellation won and the
/// future was dropped.
pub(crate) async fn run_cancellable<F: Future>(
    token: &Option<CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match token {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }
        None => Some(future.await),
    }
}
