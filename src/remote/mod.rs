//! Remote Collaborators
//!
//! Identity, debug-status and prediction logging. All three are optional
//! and best-effort: a failure here never blocks a prediction.
//!
//! ## Wire Contract
//!
//! ```text
//! GET  {debug_status_url}/debug-status?userId=<id>  → {"isDebug": bool}
//! POST {log_url}/log-prediction                     ← PredictionLogEntry
//! ```

pub mod http;

pub use http::{HttpDebugAuthority, HttpLogSink};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Remote collaborator errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("HTTP status {0}")]
    Status(u16),

    /// Host could not provide the value
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// Who is playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Response of the debug authority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStatus {
    #[serde(default)]
    pub is_debug: bool,
}

/// One shown prediction, as reported to the logging sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionLogEntry {
    pub user_id: Option<String>,
    pub prediction: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub is_debug: bool,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn user_info(&self) -> Result<UserInfo, RemoteError>;
}

#[async_trait]
pub trait DebugAuthority: Send + Sync {
    async fn debug_status(&self, user_id: &str) -> Result<DebugStatus, RemoteError>;
}

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn log_prediction(&self, entry: &PredictionLogEntry) -> Result<(), RemoteError>;
}

/// Identity fixed at startup
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<UserInfo>);

impl StaticIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(UserInfo {
            id: id.into(),
            first_name: None,
            last_name: None,
        }))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn user_info(&self) -> Result<UserInfo, RemoteError> {
        self.0
            .clone()
            .ok_or_else(|| RemoteError::Unavailable("no user configured".to_string()))
    }
}

/// Send `entry` on a detached task.
///
/// The caller does not wait; a failure is only logged. The handle is
/// returned so tests can join it.
pub fn spawn_log(sink: Arc<dyn LogSink>, entry: PredictionLogEntry) -> JoinHandle<()> {
    tokio::spawn(async move {
        match sink.log_prediction(&entry).await {
            Ok(()) => tracing::debug!(category = %entry.category, "prediction logged"),
            Err(e) => tracing::warn!(error = %e, "prediction log failed"),
        }
    })
}
