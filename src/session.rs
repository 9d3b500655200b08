//! Prediction Session
//!
//! One user's interaction flow: eligibility checks, category listing and
//! prediction requests, backed by the host's key-value store.
//!
//! ## Architecture
//!
//! ```text
//! PredictionSession
//! ├── Catalog (loaded once, immutable; or the reason it is unavailable)
//! ├── Identity (optional, tags log entries)
//! ├── Debug flag (queried once from the debug authority)
//! ├── StatsGateway → KeyValueStore
//! └── LogSink (optional, fire-and-forget)
//! ```
//!
//! ## Initialization Order
//!
//! 1. Resolve identity
//! 2. Query debug authority and fetch catalog, concurrently
//! 3. Ready for eligibility checks
//!
//! ## Request Cycle
//!
//! Every operation that touches stats runs one read-modify-write cycle:
//! read → normalize month (once) → decide/select → write. Operations take
//! `&mut self`, so cycles of one session never overlap. Writes are
//! optimistic: a failed write is logged and the shown result stands.

use crate::catalog::{CatalogSource, PredictionCatalog};
use crate::claim::record_claim;
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MAX_SHOWN_PREDICTIONS, RESERVED_CATEGORY, STATS_KEY};
use crate::eligibility::{evaluate, Eligibility, Slot};
use crate::error::{PredictionError, PredictionResult};
use crate::remote::{
    spawn_log, DebugAuthority, IdentityProvider, LogSink, PredictionLogEntry, StaticIdentity,
    UserInfo,
};
use crate::rotation::{choose_random_category, normalize_for_month, select_prediction};
use crate::stats::UserStats;
use crate::storage::{KeyValueStore, MemoryStore, StatsGateway};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage key of the stats record
    pub stats_key: String,
    /// History bound for de-duplication
    pub max_shown_predictions: usize,
    /// Category hidden from selection
    pub reserved_category: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stats_key: STATS_KEY.to_string(),
            max_shown_predictions: MAX_SHOWN_PREDICTIONS,
            reserved_category: RESERVED_CATEGORY.to_string(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            stats_key: config.storage.stats_key.clone(),
            max_shown_predictions: config.storage.max_shown_predictions,
            reserved_category: config.catalog.reserved_category.clone(),
        }
    }
}

/// Collaborators a session is built from
#[derive(Clone)]
pub struct SessionDeps {
    pub catalog_source: Arc<dyn CatalogSource>,
    pub store: Arc<dyn KeyValueStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub debug_authority: Option<Arc<dyn DebugAuthority>>,
    pub log_sink: Option<Arc<dyn LogSink>>,
    pub clock: Arc<dyn Clock>,
}

impl SessionDeps {
    /// Anonymous, in-memory, no remote services, system clock
    pub fn new(catalog_source: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog_source,
            store: Arc::new(MemoryStore::new()),
            identity: Arc::new(StaticIdentity::anonymous()),
            debug_authority: None,
            log_sink: None,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Catalog as seen by a session
#[derive(Debug, Clone)]
enum CatalogState {
    Ready(PredictionCatalog),
    Unavailable(String),
}

impl CatalogState {
    fn get(&self) -> PredictionResult<&PredictionCatalog> {
        match self {
            CatalogState::Ready(catalog) => Ok(catalog),
            CatalogState::Unavailable(reason) => {
                Err(PredictionError::CatalogUnavailable(reason.clone()))
            }
        }
    }
}

/// A prediction handed to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub text: String,
    /// Category the text was drawn from (resolved for random requests)
    pub category: String,
    pub slot: Slot,
    /// Whether the text came from the catalog rather than the fallback
    pub from_catalog: bool,
    /// Every candidate had already been shown this month
    pub repeated: bool,
    pub debug: bool,
    /// Whether the updated stats reached storage
    pub persisted: bool,
}

pub struct PredictionSession {
    config: SessionConfig,
    catalog: CatalogState,
    user: Option<UserInfo>,
    debug: bool,
    gateway: StatsGateway,
    log_sink: Option<Arc<dyn LogSink>>,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    pending_logs: Vec<JoinHandle<()>>,
}

impl PredictionSession {
    pub async fn initialize(deps: SessionDeps, config: SessionConfig) -> Self {
        Self::initialize_with_rng(deps, config, StdRng::from_entropy()).await
    }

    /// Like [`initialize`](Self::initialize) with a caller-supplied RNG
    pub async fn initialize_with_rng(deps: SessionDeps, config: SessionConfig, rng: StdRng) -> Self {
        let user = match deps.identity.user_info().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "identity resolved");
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity unavailable");
                None
            }
        };

        let (debug, catalog) = tokio::join!(
            query_debug(deps.debug_authority.as_deref(), user.as_ref()),
            load_catalog(deps.catalog_source.as_ref(), &config.reserved_category),
        );

        Self {
            gateway: StatsGateway::new(deps.store, config.stats_key.clone()),
            config,
            catalog,
            user,
            debug,
            log_sink: deps.log_sink,
            clock: deps.clock,
            rng,
            pending_logs: Vec::new(),
        }
    }

    /// Catalog loaded; prediction requests are possible
    pub fn is_ready(&self) -> bool {
        matches!(self.catalog, CatalogState::Ready(_))
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.user.as_ref()
    }

    /// May the user ask right now?
    ///
    /// A month rollover found on the way is persisted before deciding.
    pub async fn check_eligibility(&mut self) -> PredictionResult<Eligibility> {
        self.catalog.get()?;
        let now = self.clock.now();

        let (stats, rolled_over) = normalize_for_month(self.gateway.load().await, now);
        if rolled_over {
            self.persist(&stats).await;
        }

        let eligibility = evaluate(&stats, now, self.debug);
        tracing::debug!(
            eligible = eligibility.eligible,
            slot = %eligibility.slot,
            debug = self.debug,
            "eligibility checked"
        );
        Ok(eligibility)
    }

    /// Categories to offer, in catalog order
    pub fn list_categories(&self) -> PredictionResult<Vec<String>> {
        let categories = self.catalog.get()?.categories();
        if categories.is_empty() {
            return Err(PredictionError::NoCategoriesAvailable);
        }
        Ok(categories.into_iter().map(str::to_string).collect())
    }

    /// Draw a prediction from `category`, or from a random one when `None`.
    ///
    /// Eligibility is re-checked inside the same cycle, so a request in an
    /// already-claimed slot is refused with [`PredictionError::NotEligible`].
    /// An unknown or empty category yields the fallback text and consumes
    /// neither history nor quota.
    pub async fn request_prediction(
        &mut self,
        category: Option<&str>,
    ) -> PredictionResult<PredictionOutcome> {
        let catalog = self.catalog.get()?;
        let now = self.clock.now();

        let (stats, rolled_over) = normalize_for_month(self.gateway.load().await, now);
        let eligibility = evaluate(&stats, now, self.debug);
        if !eligibility.eligible {
            if rolled_over {
                self.persist(&stats).await;
            }
            return Err(PredictionError::NotEligible(eligibility));
        }

        let category = match category {
            Some(category) => category.to_string(),
            None => choose_random_category(catalog, &mut self.rng)?.to_string(),
        };

        let (selection, stats) = select_prediction(
            catalog,
            &category,
            stats,
            self.config.max_shown_predictions,
            &mut self.rng,
        );

        let stats = if selection.from_catalog {
            record_claim(stats, now, self.debug)
        } else {
            stats
        };

        let persisted = if selection.from_catalog || rolled_over {
            self.persist(&stats).await
        } else {
            true
        };

        if selection.from_catalog {
            tracing::info!(
                category = %category,
                slot = %eligibility.slot,
                repeated = selection.repeated,
                debug = self.debug,
                "prediction shown"
            );
            self.emit_log(&selection.text, &category);
        }

        Ok(PredictionOutcome {
            text: selection.text,
            category,
            slot: eligibility.slot,
            from_catalog: selection.from_catalog,
            repeated: selection.repeated,
            debug: self.debug,
            persisted,
        })
    }

    /// Wait for log tasks spawned so far.
    ///
    /// Never required for correctness; used on shutdown and in tests.
    pub async fn flush_logs(&mut self) {
        for handle in self.pending_logs.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "log task aborted");
            }
        }
    }

    async fn persist(&self, stats: &UserStats) -> bool {
        match self.gateway.save(stats).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.gateway.key(), error = %e, "stats write failed, claim not persisted");
                false
            }
        }
    }

    fn emit_log(&mut self, prediction: &str, category: &str) {
        let Some(sink) = &self.log_sink else {
            return;
        };
        self.pending_logs.retain(|h| !h.is_finished());

        let entry = PredictionLogEntry {
            user_id: self.user.as_ref().map(|u| u.id.clone()),
            prediction: prediction.to_string(),
            category: category.to_string(),
            timestamp: Utc::now(),
            is_debug: self.debug,
        };
        self.pending_logs.push(spawn_log(Arc::clone(sink), entry));
    }
}

async fn query_debug(authority: Option<&dyn DebugAuthority>, user: Option<&UserInfo>) -> bool {
    let (Some(authority), Some(user)) = (authority, user) else {
        return false;
    };
    match authority.debug_status(&user.id).await {
        Ok(status) => {
            if status.is_debug {
                tracing::info!(user_id = %user.id, "debug mode enabled");
            }
            status.is_debug
        }
        Err(e) => {
            tracing::warn!(error = %e, "debug status unavailable, debug mode off");
            false
        }
    }
}

async fn load_catalog(source: &dyn CatalogSource, reserved: &str) -> CatalogState {
    match source.fetch_catalog().await {
        Ok(catalog) => {
            tracing::info!(categories = catalog.len(), "catalog loaded");
            CatalogState::Ready(catalog.with_reserved(reserved))
        }
        Err(e) => {
            tracing::error!(error = %e, "catalog unavailable, predictions disabled");
            CatalogState::Unavailable(e.to_string())
        }
    }
}
