//! Typed network failures.
//!
//! Every failure raised while talking to the scan endpoint ends up as a
//! [`NetworkError`] carrying one of six [`ErrorKind`]s, a human-readable
//! message and, when there was one, the original error as its source.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Shared, clonable handle to the error that caused a [`NetworkError`].
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Classification of a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// DNS failure, refused or dropped connection.
    ConnectionFailure,
    /// Socket timeout or request deadline exceeded.
    Timeout,
    /// 5xx response, a 3xx surfaced as an error, or a server-side business failure.
    ServerError(u16),
    /// 4xx response.
    ClientError(u16),
    /// Response body could not be decoded.
    ParseFailure,
    Unknown,
}

impl ErrorKind {
    /// HTTP status carried by the kind, if any.
    pub fn status_code(self) -> Option<u16> {
        match self {
            ErrorKind::ServerError(code) | ErrorKind::ClientError(code) => Some(code),
            ErrorKind::ConnectionFailure
            | ErrorKind::Timeout
            | ErrorKind::ParseFailure
            | ErrorKind::Unknown => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ConnectionFailure => f.write_str("connection failure"),
            ErrorKind::Timeout => f.write_str("timeout"),
            ErrorKind::ServerError(code) => write!(f, "server error {code}"),
            ErrorKind::ClientError(code) => write!(f, "client error {code}"),
            ErrorKind::ParseFailure => f.write_str("parse failure"),
            ErrorKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// A classified network failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NetworkError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<Cause>,
}

impl NetworkError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn connection() -> Self {
        Self::new(
            ErrorKind::ConnectionFailure,
            "Network connection failed, check the network settings",
        )
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "Request timed out, try again later")
    }

    pub fn server(code: u16) -> Self {
        Self::new(
            ErrorKind::ServerError(code),
            format!("Server responded with an error (code: {code})"),
        )
    }

    pub fn client(code: u16) -> Self {
        Self::new(
            ErrorKind::ClientError(code),
            format!("Invalid request (code: {code})"),
        )
    }

    pub fn parse() -> Self {
        Self::new(ErrorKind::ParseFailure, "Failed to parse response data")
    }

    pub fn unknown() -> Self {
        Self::new(
            ErrorKind::Unknown,
            "An unknown error occurred, try again later",
        )
    }

    /// Replace the default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the error that caused this failure.
    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = cause.into();
        self.cause = Some(Arc::from(boxed));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

/// A non-success HTTP status surfaced by the transport.
///
/// Redirects are not followed, so 3xx responses arrive here as well.
#[derive(Debug, Clone, Copy, Error)]
#[error("HTTP status {status}")]
pub struct HttpStatusError {
    pub status: StatusCode,
}

impl HttpStatusError {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }
}
