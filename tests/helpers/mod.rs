//! In-process mock of the scan endpoint.
//!
//! Serves `POST /set` and `POST /set/:key` on a random local port, records
//! every request and answers from a script of replies. The last reply in the
//! script repeats once the script is exhausted.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode),
    Raw(&'static str),
    Delayed(Duration, Value),
    Redirect,
}

impl Reply {
    pub fn created(key: &str, name: &str) -> Self {
        Reply::Json(json!({ "key": key, "url": "", "name": name, "success": true }))
    }

    pub fn rejected() -> Self {
        Reply::Json(json!({ "key": "", "url": "", "name": "", "success": false }))
    }

    pub fn reported(key: &str, url: &str, success: bool) -> Self {
        Reply::Json(json!({ "key": key, "url": url, "name": "", "success": success }))
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    script: Arc<Mutex<Vec<Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    fn next_reply(&self) -> Reply {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or(Reply::Status(StatusCode::NOT_IMPLEMENTED))
        }
    }

    fn record(&self, path: String, body: Value) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { path, body });
    }
}

pub struct MockEndpoint {
    pub endpoint: Url,
    state: MockState,
}

impl MockEndpoint {
    /// Start a mock answering with `script`.
    pub async fn start(script: Vec<Reply>) -> Self {
        let state = MockState {
            script: Arc::new(Mutex::new(script)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/set", post(create_task))
            .route("/set/:key", post(update_task))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock endpoint");
        let addr = listener.local_addr().expect("Failed to get local address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock endpoint failed");
        });

        let endpoint = Url::parse(&format!("http://{addr}/set")).expect("valid mock url");
        Self { endpoint, state }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

async fn create_task(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.record("/set".to_string(), body);
    respond(state.next_reply()).await
}

async fn update_task(
    State(state): State<MockState>,
    Path(key): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(format!("/set/{key}"), body);
    respond(state.next_reply()).await
}

async fn respond(reply: Reply) -> Response {
    match reply {
        Reply::Json(value) => (StatusCode::OK, Json(value)).into_response(),
        Reply::Status(status) => status.into_response(),
        Reply::Raw(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            text,
        )
            .into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(value)).into_response()
        }
        Reply::Redirect => (StatusCode::FOUND, [(header::LOCATION, "/elsewhere")]).into_response(),
    }
}

/// An address nothing listens on.
pub fn closed_endpoint() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    Url::parse(&format!("http://{addr}/set")).expect("valid url")
}
