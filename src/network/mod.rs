//! # Network reliability layer
//!
//! Typed results, failure classification and retrying execution shared by
//! every call the client makes.
//!
//! ## Modules
//!
//! - [`error`]: [`NetworkError`] and its six [`ErrorKind`]s
//! - [`result`]: [`NetworkResult`], the three-way outcome handed to callers
//! - [`classify`]: maps raised failures onto error kinds
//! - [`retry`]: which kinds are retried and how long to wait
//! - [`call`]: runs a unit of work with classification and retries

pub mod call;
pub mod classify;
pub mod error;
pub mod result;
pub mod retry;

pub use call::{call_with_retry, safe_call};
pub use classify::classify;
pub use error::{ErrorKind, HttpStatusError, NetworkError};
pub use result::NetworkResult;
pub use retry::{backoff_delay, should_retry, RetryConfig};
