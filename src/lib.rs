//! # Pechenka
//!
//! A fortune-cookie prediction session: the user asks, picks a category,
//! and receives a pseudo-random prediction. Plays are limited to one per
//! half-day slot and shown predictions are not repeated within a month
//! while fresh ones remain.
//!
//! ## Pipeline
//!
//! ```text
//! KeyValueStore ──get──► UserStats
//!     ↓
//! [normalize_for_month]   → history reset on a new month
//!     ↓
//! [evaluate]              → eligible? which slot?
//!     ↓
//! [select_prediction]     → fresh text, bounded history
//!     ↓
//! [record_claim]          → slot date consumed (not in debug mode)
//!     ↓
//! KeyValueStore ◄──set── UserStats      LogSink ◄── fire-and-forget
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pechenka::{PredictionSession, SessionConfig, SessionDeps};
//! use pechenka::catalog::FileCatalogSource;
//! use std::sync::Arc;
//!
//! let deps = SessionDeps::new(Arc::new(FileCatalogSource::new("pechenka.json")));
//! let mut session = PredictionSession::initialize(deps, SessionConfig::default()).await;
//!
//! if session.check_eligibility().await?.eligible {
//!     let outcome = session.request_prediction(None).await?;
//!     println!("{}", outcome.text);
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `eligibility` | Slot gating |
//! | `rotation` | Monthly history and de-duplicated selection |
//! | `claim` | Quota consumption |
//! | `storage` | Key-value seam and stats gateway |
//! | `catalog` | Category → texts mapping and its sources |
//! | `remote` | Identity, debug authority, logging sink |
//! | `session` | The session tying it together |

pub mod catalog;
pub mod claim;
pub mod clock;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod messages;
pub mod remote;
pub mod rotation;
pub mod session;
pub mod stats;
pub mod storage;

pub use catalog::{CatalogError, CatalogSource, PredictionCatalog};
pub use claim::record_claim;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, MAX_SHOWN_PREDICTIONS, RESERVED_CATEGORY, STATS_KEY};
pub use eligibility::{evaluate, Eligibility, IneligibleReason, Slot};
pub use error::{PredictionError, PredictionResult};
pub use rotation::{choose_random_category, normalize_for_month, select_prediction, Selection};
pub use session::{PredictionOutcome, PredictionSession, SessionConfig, SessionDeps};
pub use stats::UserStats;
pub use storage::{KeyValueStore, StatsGateway, StorageError};
