//! Scan task HTTP client
//!
//! Two operations over a single JSON endpoint:
//!
//! - `POST {endpoint}` creates a scan task and returns its key
//! - `POST {endpoint}/{key}` reports one scanned value
//!
//! Both run through [`call_with_retry`], so callers only ever see a
//! [`NetworkResult`]. Each attempt builds its own `reqwest::Client` and drops
//! it when the attempt ends; nothing is pooled across calls.

pub mod types;

use std::time::Duration;

use anyhow::Context;
use reqwest::redirect::Policy;
use tracing::{debug, info};
use url::Url;

use crate::config::{ClientConfig, ConfigError, DEFAULT_REQUEST_TIMEOUT};
use crate::network::{call_with_retry, HttpStatusError, NetworkError, NetworkResult, RetryConfig};

pub use types::{ScanSession, SetRequest, SetResponse, ShareLinks};

#[derive(Debug, Clone)]
pub struct ScanClient {
    endpoint: Url,
    request_timeout: Duration,
    create_retry: RetryConfig,
    report_retry: RetryConfig,
}

impl ScanClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            create_retry: RetryConfig::create_session(),
            report_retry: RetryConfig::report_scan(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let endpoint = config.require_endpoint()?.clone();
        Ok(Self::new(endpoint).with_request_timeout(config.request_timeout))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_create_retry(mut self, retry: RetryConfig) -> Self {
        self.create_retry = retry;
        self
    }

    pub fn with_report_retry(mut self, retry: RetryConfig) -> Self {
        self.report_retry = retry;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Create a scan task named `name` and return its key.
    ///
    /// A response with `success: false` is raised as `ServerError(500)` inside
    /// the attempt, so it is retried like a transport failure.
    pub async fn create_session(&self, name: &str) -> NetworkResult<String> {
        let result = call_with_retry(self.create_retry, || self.create_attempt(name)).await;
        if let NetworkResult::Success(key) = &result {
            info!(key = %key, name = %name, "Created scan task");
        }
        result
    }

    /// Report a scanned value to the task identified by `key`.
    ///
    /// Returns the endpoint's `success` flag as-is.
    pub async fn report_scan(
        &self,
        name: Option<&str>,
        key: &str,
        value: &str,
    ) -> NetworkResult<bool> {
        let url = self.task_url(key);
        call_with_retry(self.report_retry, || self.report_attempt(&url, name, value)).await
    }

    pub fn share_links(&self, key: &str) -> ShareLinks {
        ShareLinks::new(self.endpoint.as_str(), key)
    }

    fn task_url(&self, key: &str) -> String {
        format!("{}/{}", self.endpoint.as_str().trim_end_matches('/'), key)
    }

    async fn create_attempt(&self, name: &str) -> anyhow::Result<String> {
        let request = SetRequest {
            url: "",
            name: Some(name),
        };
        let response = self.post(self.endpoint.as_str(), &request).await?;
        if !response.success {
            return Err(NetworkError::server(500)
                .with_message("Failed to create scan task")
                .into());
        }
        Ok(response.key)
    }

    async fn report_attempt(
        &self,
        url: &str,
        name: Option<&str>,
        value: &str,
    ) -> anyhow::Result<bool> {
        let request = SetRequest { url: value, name };
        let response = self.post(url, &request).await?;
        debug!(url = %url, accepted = response.success, "Reported scanned value");
        Ok(response.success)
    }

    /// One attempt: fresh transport, POST, status check, decode.
    async fn post(&self, url: &str, request: &SetRequest<'_>) -> anyhow::Result<SetResponse> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .redirect(Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        let response = client.post(url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpStatusError::new(status).into());
        }

        let body = response.bytes().await?;
        let parsed = serde_json::from_slice::<SetResponse>(&body)?;
        Ok(parsed)
    }
}
