//! EasyScan - client core for scan sessions
//!
//! A scan session is a server-side task identified by a key. The user
//! creates one, feeds scanned QR/barcode values into it, and every value is
//! pushed to the endpoint. Past sessions are kept in a local history.
//!
//! ## Call chain
//! User action -> [`flow::ScanFlow`] -> [`client::ScanClient`] ->
//! [`network::call_with_retry`] (classify + retry) -> [`network::NetworkResult`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use easyscan::client::ScanClient;
//! use easyscan::config::parse_endpoint;
//! use easyscan::flow::ScanFlow;
//! use easyscan::history::HistoryStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = ScanClient::new(parse_endpoint("https://scan.example.com/set")?);
//! let history = Arc::new(HistoryStore::open_file("easyscan_settings.json").await?);
//! let flow = ScanFlow::new(client, history);
//!
//! let session = flow.start_session("Warehouse A").await?;
//! println!("{}", flow.share_links(&session).view);
//! # Ok(())
//! # }
//! ```

// Typed results, classification and retries
pub mod network;

// HTTP client for the scan endpoint
pub mod client;

// Durable session history
pub mod history;

pub mod config;
pub mod flow;

pub use client::{ScanClient, ScanSession, ShareLinks};
pub use config::{ClientConfig, ConfigError};
pub use flow::{FlowError, ScanFlow, ScanReporter, ScanState};
pub use history::{HistoryEntry, HistoryStore, StoreError};
pub use network::{ErrorKind, NetworkError, NetworkResult, RetryConfig};
