//! Maps raised failures onto [`NetworkError`] kinds.
//!
//! Rules are checked in a fixed order and the first match wins. Some
//! failures satisfy more than one predicate (a reqwest connect timeout is
//! both a connect error and a timeout), so the order is part of the
//! contract:
//!
//! 1. already a `NetworkError`: returned unchanged
//! 2. connection failure
//! 3. timeout
//! 4. 4xx status
//! 5. 5xx status
//! 6. 3xx status
//! 7. body decode failure
//! 8. anything else

use std::io;

use reqwest::StatusCode;
use tokio::time::error::Elapsed;

use super::error::{HttpStatusError, NetworkError};

const UNKNOWN_FALLBACK: &str = "An unknown error occurred";

/// Classify a raised failure. Total: every input maps to exactly one kind.
pub fn classify(raised: anyhow::Error) -> NetworkError {
    let raised = match raised.downcast::<NetworkError>() {
        Ok(classified) => return classified,
        Err(other) => other,
    };

    if is_connection_failure(&raised) {
        return NetworkError::connection().with_cause(raised);
    }

    if is_timeout(&raised) {
        return NetworkError::timeout().with_cause(raised);
    }

    if let Some(status) = http_status(&raised) {
        let code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("unrecognised status");
        let classified = match code {
            400..=499 => {
                Some(NetworkError::client(code).with_message(format!("Request error: {reason}")))
            }
            500..=599 => {
                Some(NetworkError::server(code).with_message(format!("Server error: {reason}")))
            }
            300..=399 => {
                Some(NetworkError::server(code).with_message(format!("Redirect error: {reason}")))
            }
            _ => None,
        };
        if let Some(classified) = classified {
            return classified.with_cause(raised);
        }
    }

    if let Some(detail) = decode_failure(&raised) {
        return NetworkError::parse()
            .with_message(format!("Malformed data: {detail}"))
            .with_cause(raised);
    }

    let message = raised.to_string();
    let message = if message.trim().is_empty() {
        UNKNOWN_FALLBACK.to_string()
    } else {
        message
    };
    NetworkError::unknown().with_message(message).with_cause(raised)
}

fn is_connection_failure(raised: &anyhow::Error) -> bool {
    if let Some(err) = raised.downcast_ref::<reqwest::Error>() {
        if err.is_connect() {
            return true;
        }
    }
    raised
        .chain()
        .filter_map(|err| err.downcast_ref::<io::Error>())
        .any(|err| {
            matches!(
                err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::AddrNotAvailable
            )
        })
}

fn is_timeout(raised: &anyhow::Error) -> bool {
    if let Some(err) = raised.downcast_ref::<reqwest::Error>() {
        if err.is_timeout() {
            return true;
        }
    }
    if raised.downcast_ref::<Elapsed>().is_some() {
        return true;
    }
    raised
        .chain()
        .filter_map(|err| err.downcast_ref::<io::Error>())
        .any(|err| err.kind() == io::ErrorKind::TimedOut)
}

fn http_status(raised: &anyhow::Error) -> Option<StatusCode> {
    if let Some(err) = raised.downcast_ref::<HttpStatusError>() {
        return Some(err.status);
    }
    raised
        .downcast_ref::<reqwest::Error>()
        .and_then(|err| err.status())
}

fn decode_failure(raised: &anyhow::Error) -> Option<String> {
    if let Some(err) = raised.downcast_ref::<serde_json::Error>() {
        return Some(err.to_string());
    }
    raised
        .downcast_ref::<reqwest::Error>()
        .filter(|err| err.is_decode())
        .map(|err| err.to_string())
}
