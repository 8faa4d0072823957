//! Wire and domain types for the scan endpoint.

use serde::{Deserialize, Serialize};

/// Body of every POST to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SetRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

/// Response to every POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetResponse {
    pub key: String,
    pub url: String,
    pub name: String,
    pub success: bool,
}

/// A server-side scan task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanSession {
    /// Server-issued key.
    pub key: String,
    /// Name the user gave the task.
    pub name: String,
}

impl ScanSession {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Links that expose a scan task to other people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    /// Latest scanned value.
    pub view: String,
    /// Redirects to the latest scanned value.
    pub redirect: String,
    /// QR code image of the latest scanned value.
    pub qrcode: String,
}

impl ShareLinks {
    pub fn new(endpoint: &str, key: &str) -> Self {
        let base = format!("{}/{}", endpoint.trim_end_matches('/'), key);
        Self {
            redirect: format!("{base}/redirect"),
            qrcode: format!("{base}/qrcode"),
            view: base,
        }
    }

    /// Text suitable for a share sheet or the clipboard.
    pub fn share_text(&self, name: &str) -> String {
        format!(
            "Scan task \"{name}\"\nView: {}\nOpen: {}\nQR code: {}",
            self.view, self.redirect, self.qrcode
        )
    }
}
