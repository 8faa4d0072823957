//! ScanClient against an in-process mock endpoint.
//!
//! Run with: cargo test --test client_endpoint

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use easyscan::{ErrorKind, NetworkResult, RetryConfig, ScanClient};
use helpers::{closed_endpoint, MockEndpoint, Reply};
use serde_json::json;

/// Production attempt counts with short delays so the suite stays fast.
fn fast_client(endpoint: url::Url) -> ScanClient {
    ScanClient::new(endpoint)
        .with_create_retry(RetryConfig::new(3, Duration::from_millis(10)))
        .with_report_retry(RetryConfig::new(2, Duration::from_millis(10)))
}

fn kind<T>(result: &NetworkResult<T>) -> Option<ErrorKind> {
    result.error().map(|e| e.kind())
}

#[tokio::test]
async fn create_session_returns_server_key() {
    let mock = MockEndpoint::start(vec![Reply::created("abc123", "Trip")]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.create_session("Trip").await;

    assert_eq!(result.success().as_deref(), Some("abc123"));
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/set");
    assert_eq!(requests[0].body, json!({ "url": "", "name": "Trip" }));
}

#[tokio::test]
async fn create_session_rejection_is_retried_as_server_error() {
    let mock = MockEndpoint::start(vec![Reply::rejected()]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.create_session("Trip").await;

    assert_eq!(kind(&result), Some(ErrorKind::ServerError(500)));
    assert_eq!(
        result.error().map(|e| e.message().to_string()).as_deref(),
        Some("Failed to create scan task")
    );
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn create_session_recovers_after_transient_failure() {
    let mock = MockEndpoint::start(vec![
        Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
        Reply::created("k-42", "Inventory"),
    ])
    .await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.create_session("Inventory").await;

    assert_eq!(result.success().as_deref(), Some("k-42"));
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn report_scan_posts_value_to_task_path() {
    let mock = MockEndpoint::start(vec![Reply::reported(
        "abc123",
        "https://example.com/item/9",
        true,
    )])
    .await;
    let client = fast_client(mock.endpoint.clone());

    let result = client
        .report_scan(Some("Trip"), "abc123", "https://example.com/item/9")
        .await;

    assert_eq!(result.success(), Some(true));
    let requests = mock.requests();
    assert_eq!(requests[0].path, "/set/abc123");
    assert_eq!(
        requests[0].body,
        json!({ "url": "https://example.com/item/9", "name": "Trip" })
    );
}

#[tokio::test]
async fn report_scan_without_name_omits_field() {
    let mock = MockEndpoint::start(vec![Reply::reported("abc123", "v", true)]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.report_scan(None, "abc123", "v").await;

    assert!(result.is_success());
    assert_eq!(mock.requests()[0].body, json!({ "url": "v" }));
}

#[tokio::test]
async fn report_scan_returns_false_without_retry() {
    let mock = MockEndpoint::start(vec![Reply::reported("abc123", "v", false)]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.report_scan(Some("Trip"), "abc123", "v").await;

    assert_eq!(result.success(), Some(false));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let mock = MockEndpoint::start(vec![Reply::Status(StatusCode::NOT_FOUND)]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.report_scan(None, "missing", "v").await;

    assert_eq!(kind(&result), Some(ErrorKind::ClientError(404)));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn server_error_uses_every_attempt() {
    let mock = MockEndpoint::start(vec![Reply::Status(StatusCode::BAD_GATEWAY)]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.report_scan(None, "abc123", "v").await;

    assert_eq!(kind(&result), Some(ErrorKind::ServerError(502)));
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn redirect_is_surfaced_as_server_error() {
    let mock = MockEndpoint::start(vec![Reply::Redirect]).await;
    let client = fast_client(mock.endpoint.clone())
        .with_create_retry(RetryConfig::no_retry());

    let result = client.create_session("Trip").await;

    assert_eq!(kind(&result), Some(ErrorKind::ServerError(302)));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn malformed_body_is_parse_failure() {
    let mock = MockEndpoint::start(vec![Reply::Raw("{\"key\": 12")]).await;
    let client = fast_client(mock.endpoint.clone());

    let result = client.create_session("Trip").await;

    assert_eq!(kind(&result), Some(ErrorKind::ParseFailure));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let mock = MockEndpoint::start(vec![Reply::Delayed(
        Duration::from_secs(2),
        json!({ "key": "k", "url": "", "name": "", "success": true }),
    )])
    .await;
    let client = fast_client(mock.endpoint.clone()).with_request_timeout(Duration::from_millis(100));

    let result = client.report_scan(None, "k", "v").await;

    assert_eq!(kind(&result), Some(ErrorKind::Timeout));
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn refused_connection_is_connection_failure() {
    let client = fast_client(closed_endpoint());

    let result = client.create_session("Trip").await;

    assert_eq!(kind(&result), Some(ErrorKind::ConnectionFailure));
}

#[tokio::test]
async fn share_links_follow_endpoint() {
    let client = ScanClient::new(url::Url::parse("https://scan.example.com/set").unwrap());
    let links = client.share_links("abc123");
    assert_eq!(links.view, "https://scan.example.com/set/abc123");
    assert_eq!(links.redirect, "https://scan.example.com/set/abc123/redirect");
    assert_eq!(links.qrcode, "https://scan.example.com/set/abc123/qrcode");
}
