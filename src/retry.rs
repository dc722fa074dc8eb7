//! Retry with exponential backoff for transient provider failures.
//!
//! The wrapper is oblivious to what the wrapped operation does; it only
//! classifies failures and schedules re-attempts. Non-transient errors
//! propagate unchanged on first occurrence.

use crate::Error;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;

/// Default retry budget: 4 retries, 5 attempts total.
pub const DEFAULT_MAX_RETRIES: usize = 4;

/// Default base backoff delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// Whether a failure may succeed if retried after a delay.
///
/// Transient: rate limiting (429) and overload (503), by status code when
/// available and by message substring otherwise.
pub fn is_transient(error: &Error) -> bool {
    if let Some(status) = error.status_code() {
        if status == 429 || status == 503 {
            return true;
        }
    }
    let message = error.to_string();
    message.contains("429")
        || message.contains("Resource has been exhausted")
        || message.contains("Quota exceeded")
        || message.contains("Overloaded")
}

/// Deterministic doubling backoff sequence: base, 2x, 4x, ... No jitter.
pub fn backoff(base_delay: Duration) -> impl Iterator<Item = Duration> {
    std::iter::successors(Some(base_delay), |delay| delay.checked_mul(2))
}

/// Run `action`, retrying transient failures up to `max_retries` times with
/// doubling delays starting at `base_delay`. The action is invoked at most
/// `max_retries + 1` times.
pub async fn with_retry<A, F, T>(
    action: A,
    max_retries: usize,
    base_delay: Duration,
) -> crate::Result<T>
where
    A: FnMut() -> F,
    F: Future<Output = crate::Result<T>>,
{
    RetryIf::spawn(backoff(base_delay).take(max_retries), action, is_transient).await
}
