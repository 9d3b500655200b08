//! Prediction Catalog
//!
//! The static category → texts mapping, and the sources it can be loaded
//! from. A catalog is loaded once per session and never changes after.
//!
//! The document is a JSON object whose values are arrays of strings:
//!
//! ```json
//! {
//!   "Любовь": ["...", "..."],
//!   "Работа": ["..."],
//!   "Нейтральные и универсальные": ["..."]
//! }
//! ```
//!
//! Category order follows the document.

use crate::config::RESERVED_CATEGORY;
use crate::remote::http::build_client;
use async_trait::async_trait;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("HTTP status {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Document is not an object of string arrays
    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Category name → ordered prediction texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionCatalog {
    entries: Vec<(String, Vec<String>)>,
    reserved: String,
}

impl PredictionCatalog {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self {
            entries,
            reserved: RESERVED_CATEGORY.to_string(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the category hidden from selection
    #[must_use]
    pub fn with_reserved(mut self, reserved: impl Into<String>) -> Self {
        self.reserved = reserved.into();
        self
    }

    /// No categories at all, reserved one included
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Selectable categories in document order
    pub fn categories(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| *name != self.reserved)
            .collect()
    }

    /// Candidate texts for a category, if it exists
    pub fn predictions(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, texts)| texts.as_slice())
    }
}

impl<'de> Deserialize<'de> for PredictionCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = PredictionCatalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping category names to arrays of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, Vec<String>)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, texts)) = map.next_entry::<String, Vec<String>>()? {
                    // a repeated key keeps its first position and its last value
                    match entries.iter_mut().find(|(existing, _)| *existing == name) {
                        Some((_, slot)) => *slot = texts,
                        None => entries.push((name, texts)),
                    }
                }
                Ok(PredictionCatalog::new(entries))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// One-shot catalog retrieval
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<PredictionCatalog, CatalogError>;
}

/// Catalog bundled as a local JSON file
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_catalog(&self) -> Result<PredictionCatalog, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        PredictionCatalog::from_json(&raw)
    }
}

/// Catalog served as a static asset
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            client: build_client(timeout),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> Result<PredictionCatalog, CatalogError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }
        let body = resp.text().await?;
        PredictionCatalog::from_json(&body)
    }
}

/// Catalog already in memory
#[derive(Debug, Clone)]
pub struct StaticCatalogSource(pub PredictionCatalog);

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_catalog(&self) -> Result<PredictionCatalog, CatalogError> {
        Ok(self.0.clone())
    }
}
