//! Client configuration
//!
//! Resolved from environment variables (a `.env` file is honoured by the
//! binary through `dotenvy`):
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `EASYSCAN_ENDPOINT` | base URL of the scan endpoint | none |
//! | `EASYSCAN_TIMEOUT_MS` | per-request timeout | 30000 |
//! | `EASYSCAN_HISTORY_PATH` | history preference file | `./easyscan_settings.json` |

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const ENDPOINT_VAR: &str = "EASYSCAN_ENDPOINT";
pub const TIMEOUT_VAR: &str = "EASYSCAN_TIMEOUT_MS";
pub const HISTORY_PATH_VAR: &str = "EASYSCAN_HISTORY_PATH";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_HISTORY_FILE: &str = "easyscan_settings.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("Invalid value for {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Option<Url>,
    pub request_timeout: Duration,
    pub history_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_path: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_empty(lookup(ENDPOINT_VAR)) {
            config.endpoint = Some(parse_endpoint(&raw)?);
        }

        if let Some(raw) = non_empty(lookup(TIMEOUT_VAR)) {
            let millis = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_millis(millis);
        }

        if let Some(raw) = non_empty(lookup(HISTORY_PATH_VAR)) {
            config.history_path = PathBuf::from(raw);
        }

        Ok(config)
    }

    /// The endpoint, or an error naming the variable to set.
    pub fn require_endpoint(&self) -> Result<&Url, ConfigError> {
        self.endpoint.as_ref().ok_or(ConfigError::Missing(ENDPOINT_VAR))
    }
}

/// Parse and validate an endpoint URL. Only http and https are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
