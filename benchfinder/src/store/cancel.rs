//! Cancellation and deadline helpers for store operations.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::StoreError;

/// Runs `operation` unless `cancel` fires first.
///
/// An already-cancelled token short-circuits without polling the operation.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        result = operation => result,
    }
}

/// Creates a child of `parent` that is also cancelled once `timeout` elapses.
///
/// The timer task exits as soon as the child is cancelled by either cause.
/// Must be called from within a Tokio runtime.
pub fn deadline_token(parent: &CancellationToken, timeout: Duration) -> CancellationToken {
    let token = parent.child_token();
    let timer = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(timeout) => timer.cancel(),
        }
    });

    token
}
