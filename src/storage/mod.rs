//! Storage Module
//!
//! The session only needs two operations from its host's key-value store:
//! `get` and `set`, both string-valued and both fallible. This module
//! defines that seam and the gateway that keeps `UserStats` behind it.
//!
//! ## Backends
//!
//! - `MemoryStore`: process-local map, for tests and embedding
//! - `FileStore`: one JSON object on disk, for the terminal host
//!
//! ## Failure Model
//!
//! - Read failures fall back to default stats
//! - Write failures are reported to the caller, which logs and moves on

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::stats::UserStats;
use async_trait::async_trait;
use std::sync::Arc;

/// Host key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, `None` if never set
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Reads and writes the stats record under one fixed key
#[derive(Clone)]
pub struct StatsGateway {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl StatsGateway {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current stats; defaults when the read fails or the value is unusable
    pub async fn load(&self) -> UserStats {
        match self.store.get(&self.key).await {
            Ok(raw) => UserStats::from_stored(raw.as_deref()),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "stats read failed, using defaults");
                UserStats::default()
            }
        }
    }

    pub async fn save(&self, stats: &UserStats) -> StorageResult<()> {
        let value = stats.to_json()?;
        self.store.set(&self.key, &value).await
    }
}
