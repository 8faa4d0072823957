//! Safe execution of network work.
//!
//! A unit of work is any closure producing a future of `anyhow::Result<T>`.
//! Failures never escape: they are classified into a [`NetworkError`] and
//! returned as [`NetworkResult::Error`]. Dropping the returned future cancels
//! the call, including a pending backoff sleep.

use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::classify::classify;
use super::error::NetworkError;
use super::result::NetworkResult;
use super::retry::{should_retry, RetryConfig};

/// Run `work` once and classify any failure.
pub async fn safe_call<T, F, Fut>(work: F) -> NetworkResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    match work().await {
        Ok(data) => NetworkResult::Success(data),
        Err(raised) => NetworkResult::Error(classify(raised)),
    }
}

/// Run `work` up to `config.max_retries` times.
///
/// Stops at the first success, at the first non-retryable failure, or after
/// the last attempt. Between attempts it sleeps `base_delay * (n + 1)` where
/// `n` is the 0-based index of the attempt that just failed.
pub async fn call_with_retry<T, F, Fut>(config: RetryConfig, mut work: F) -> NetworkResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    for attempt in 0..config.max_retries {
        let error = match work().await {
            Ok(data) => return NetworkResult::Success(data),
            Err(raised) => classify(raised),
        };

        let is_last = attempt + 1 == config.max_retries;
        if is_last || !should_retry(error.kind()) {
            debug!(
                attempt = attempt + 1,
                max_attempts = config.max_retries,
                kind = %error.kind(),
                "network call failed: {}",
                error
            );
            return NetworkResult::Error(error);
        }

        let delay = config.delay_for(attempt);
        warn!(
            attempt = attempt + 1,
            max_attempts = config.max_retries,
            kind = %error.kind(),
            "network call failed: {}. Retrying in {:?}",
            error,
            delay
        );
        sleep(delay).await;
    }

    NetworkResult::Error(NetworkError::unknown().with_message("Retry limit reached"))
}
