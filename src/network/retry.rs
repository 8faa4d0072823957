//! Retry policy with linear backoff
//!
//! Transient failures (connection problems, timeouts, server errors) are
//! retried; everything that would fail the same way again is not.

use std::time::Duration;

use super::error::ErrorKind;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one
    pub max_retries: u32,
    /// Delay before the first retry; later retries wait a multiple of it
    pub base_delay: Duration,
}

impl RetryConfig {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Session creation: 3 attempts, 1s base delay
    pub const fn create_session() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }

    /// Scan reporting: 2 attempts, 500ms base delay
    pub const fn report_scan() -> Self {
        Self::new(2, Duration::from_millis(500))
    }

    /// A single attempt, no waiting
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after the failed attempt with the given 0-based index.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        backoff_delay(self.base_delay, attempt_index)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::create_session()
    }
}

/// Whether a failure of this kind is worth another attempt.
pub fn should_retry(kind: ErrorKind) -> bool {
    match kind {
        ErrorKind::ConnectionFailure | ErrorKind::Timeout | ErrorKind::ServerError(_) => true,
        ErrorKind::ClientError(_) | ErrorKind::ParseFailure | ErrorKind::Unknown => false,
    }
}

/// Linear backoff: `base * (attempt_index + 1)`.
pub fn backoff_delay(base: Duration, attempt_index: u32) -> Duration {
    base.saturating_mul(attempt_index.saturating_add(1))
}
