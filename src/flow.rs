//! Scan flow - what a user action does, minus the screens.
//!
//! Starting a session validates the name, creates the task on the server and
//! records it in the history. Reporting consumes a stream of scanned values
//! (the camera, or stdin in the CLI), skips consecutive duplicates, and keeps
//! only the latest value in flight: a new value cancels the report of an
//! older one that has not finished yet.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ScanClient, ScanSession, ShareLinks};
use crate::history::{HistoryEntry, HistoryStore};
use crate::network::{NetworkError, NetworkResult};

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Scan task name must not be blank")]
    EmptyName,

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub struct ScanFlow {
    client: ScanClient,
    history: Arc<HistoryStore>,
}

impl ScanFlow {
    pub fn new(client: ScanClient, history: Arc<HistoryStore>) -> Self {
        Self { client, history }
    }

    pub fn client(&self) -> &ScanClient {
        &self.client
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// Create a scan task and remember it.
    ///
    /// The history write happens only on success. If it fails the session is
    /// still returned, since the task already exists on the server.
    pub async fn start_session(&self, name: &str) -> Result<ScanSession, FlowError> {
        if name.trim().is_empty() {
            return Err(FlowError::EmptyName);
        }

        let key = self.client.create_session(name).await.into_result()?;
        let session = ScanSession::new(key, name);

        if let Err(e) = self.history.append(&HistoryEntry::from(&session)).await {
            warn!(key = %session.key, error = %e, "Failed to record scan task in history");
        }
        Ok(session)
    }

    pub fn share_links(&self, session: &ScanSession) -> ShareLinks {
        self.client.share_links(&session.key)
    }

    pub fn reporter(&self, session: ScanSession) -> ScanReporter {
        ScanReporter::new(self.client.clone(), session)
    }
}

/// Reporting state of an active scan session.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Value most recently handed to the endpoint.
    pub current: Option<String>,
    /// Outcome of reporting `current`; `Loading` while the request runs.
    pub outcome: Option<NetworkResult<bool>>,
    /// Values the endpoint accepted, oldest first.
    pub accepted: Vec<String>,
}

/// Receiver that yields on every reporting state change.
pub type ScanWatcher = watch::Receiver<ScanState>;

pub struct ScanReporter {
    client: ScanClient,
    session: Arc<ScanSession>,
    state: Arc<watch::Sender<ScanState>>,
}

impl ScanReporter {
    pub fn new(client: ScanClient, session: ScanSession) -> Self {
        let (state, _) = watch::channel(ScanState::default());
        Self {
            client,
            session: Arc::new(session),
            state: Arc::new(state),
        }
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn subscribe(&self) -> ScanWatcher {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    /// Report every distinct value of `values` until the stream ends.
    ///
    /// Consecutive duplicates are dropped first, then empty values, so an
    /// empty value between two equal ones lets the second be reported.
    ///
    /// Returns the number of reports started. Waits for the last report
    /// before returning.
    pub async fn run<S>(&self, values: S) -> usize
    where
        S: Stream<Item = String>,
    {
        let mut values = std::pin::pin!(values);
        let mut previous: Option<String> = None;
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut started = 0;

        while let Some(value) = values.next().await {
            if previous.as_deref() == Some(value.as_str()) {
                continue;
            }
            previous = Some(value.clone());
            if value.is_empty() {
                continue;
            }

            if let Some(handle) = in_flight.take() {
                handle.abort();
            }
            in_flight = Some(self.spawn_report(value));
            started += 1;
        }

        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Scan report task failed");
                }
            }
        }
        started
    }

    fn spawn_report(&self, value: String) -> JoinHandle<()> {
        self.state.send_modify(|state| {
            state.current = Some(value.clone());
            state.outcome = Some(NetworkResult::Loading);
        });

        let client = self.client.clone();
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            debug!(key = %session.key, value = %value, "Reporting scanned value");
            let outcome = client
                .report_scan(Some(&session.name), &session.key, &value)
                .await;

            // A newer value may have replaced this one while the request ran.
            state.send_if_modified(|current| {
                if current.current.as_deref() != Some(value.as_str()) {
                    return false;
                }
                if matches!(outcome, NetworkResult::Success(true)) {
                    current.accepted.push(value.clone());
                }
                current.outcome = Some(outcome);
                true
            });
        })
    }
}
