//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - config.toml (default configuration)
//! - config.local.toml (git-ignored local overrides)
//! - Environment variables (PECHENKA_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # config.toml
//! [catalog]
//! source = "https://cdn.example.org/pechenka.json"
//!
//! [storage]
//! path = "/var/lib/pechenka/storage.json"
//!
//! [remote]
//! debug_status_url = "https://admin.example.org/api"
//! log_url = "https://admin.example.org/api"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! PECHENKA_STORAGE__PATH=/custom/storage.json
//! PECHENKA_REMOTE__TIMEOUT_MS=2000
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Category excluded from menus and random picks.
pub const RESERVED_CATEGORY: &str = "Нейтральные и универсальные";

/// Storage key of the per-user stats record.
pub const STATS_KEY: &str = "pechenka_user_stats";

/// Bound of the monthly de-duplication window.
pub const MAX_SHOWN_PREDICTIONS: usize = 30;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where predictions come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// File path or `http(s)://` URL of the catalog JSON document
    #[serde(default = "default_catalog_source")]
    pub source: String,

    /// Category hidden from the menu and from random selection
    #[serde(default = "default_reserved_category")]
    pub reserved_category: String,
}

/// Key-value storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the key-value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key under which the stats record is stored
    #[serde(default = "default_stats_key")]
    pub stats_key: String,

    /// Maximum remembered predictions per month
    #[serde(default = "default_max_shown_predictions")]
    pub max_shown_predictions: usize,
}

/// Optional remote debug authority and logging sink.
///
/// Both are off when their URL is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the debug-status authority
    #[serde(default)]
    pub debug_status_url: Option<String>,

    /// Base URL of the prediction logging sink
    #[serde(default)]
    pub log_url: Option<String>,

    /// Per-request timeout in milliseconds. 0 = no timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Identity reported by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_catalog_source() -> String {
    "data/pechenka.json".to_string()
}
fn default_reserved_category() -> String {
    RESERVED_CATEGORY.to_string()
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("data/storage.json")
}
fn default_stats_key() -> String {
    STATS_KEY.to_string()
}
fn default_max_shown_predictions() -> usize {
    MAX_SHOWN_PREDICTIONS
}
fn default_timeout_ms() -> u64 {
    5_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. built-in defaults
    /// 2. config.toml (base configuration)
    /// 3. config.local.toml (local overrides, git-ignored)
    /// 4. Environment variables (PECHENKA_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("PECHENKA_").split("__"))
            .extract()
    }

    /// Load configuration from specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PECHENKA_").split("__"))
            .extract()
    }
}

impl RemoteConfig {
    /// Request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl CatalogConfig {
    /// Whether the source should be fetched over HTTP
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            source: default_catalog_source(),
            reserved_category: default_reserved_category(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: default_storage_path(),
            stats_key: default_stats_key(),
            max_shown_predictions: default_max_shown_predictions(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            debug_status_url: None,
            log_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
