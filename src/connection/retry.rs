use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::AdapterError;
use crate::session::SqlSession;

/// Quadratic backoff: 1s, 4s, 9s, ... for attempts 1, 2, 3, ...
#[must_use]
pub fn exponential_backoff(attempt: u32) -> Duration {
    Duration::from_secs(u64::from(attempt) * u64::from(attempt))
}

/// Drive `connect` until it yields a session, retrying transient failures.
///
/// `retry_limit` bounds how many retries follow the first attempt, and
/// `retry_timeout` maps the attempt number to the delay slept before it.
///
/// # Errors
/// Returns the final error once no retries remain, or immediately when the
/// failure is not retryable.
pub async fn retry_connection<F, Fut>(
    name: &str,
    mut connect: F,
    retry_limit: u32,
    retry_timeout: impl Fn(u32) -> Duration,
) -> Result<Box<dyn SqlSession>, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Box<dyn SqlSession>, AdapterError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match connect().await {
            Ok(session) => return Ok(session),
            Err(e) if e.is_retryable() && attempt < retry_limit => {
                attempt += 1;
                warn!(
                    connection = %name,
                    attempt,
                    retry_limit,
                    error = %e,
                    "got a retryable error when attempting to open a connection"
                );
                tokio::time::sleep(retry_timeout(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
