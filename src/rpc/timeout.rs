//! Deadline for blocking RPC calls
//!
//! `corepc-client` is synchronous, so each call runs on the blocking pool
//! under a tokio timeout. There is no retry here; a failed or timed-out call
//! is reported once and the lookup coordinator decides what happens next.

use crate::errors::{RpcError, RpcResult};
use std::time::Duration;
use tokio::task::spawn_blocking;
use tokio::time::timeout;

/// Run `call` on the blocking pool and give up after `timeout_seconds`
///
/// A call still running at the deadline becomes `RpcError::Timeout` naming
/// `method`; a panicked task becomes `RpcError::CallFailed`. The call's own
/// error is passed through unchanged.
pub async fn run_blocking<T, F>(method: &str, timeout_seconds: u64, call: F) -> RpcResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    let deadline = Duration::from_secs(timeout_seconds);

    match timeout(deadline, spawn_blocking(call)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(RpcError::CallFailed {
            method: method.to_string(),
            message: format!("blocking task did not complete: {}", join_error),
        }),
        Err(_) => Err(RpcError::Timeout {
            timeout_seconds,
            operation: method.to_string(),
        }),
    }
}
