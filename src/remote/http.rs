//! reqwest-backed debug authority and logging sink.

use super::{DebugAuthority, DebugStatus, LogSink, PredictionLogEntry, RemoteError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Client with the configured timeout, or reqwest's defaults if the
/// builder is rejected.
pub(crate) fn build_client(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, ?timeout, "http client setup failed, timeout not applied");
        Client::new()
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct HttpDebugAuthority {
    client: Client,
    base_url: String,
}

impl HttpDebugAuthority {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DebugAuthority for HttpDebugAuthority {
    async fn debug_status(&self, user_id: &str) -> Result<DebugStatus, RemoteError> {
        let resp = self
            .client
            .get(endpoint(&self.base_url, "debug-status"))
            .query(&[("userId", user_id)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }
}

#[derive(Debug, Clone)]
pub struct HttpLogSink {
    client: Client,
    base_url: String,
}

impl HttpLogSink {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client: build_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LogSink for HttpLogSink {
    async fn log_prediction(&self, entry: &PredictionLogEntry) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(endpoint(&self.base_url, "log-prediction"))
            .json(entry)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}
