//! Errors surfaced to the UI layer.
//!
//! Storage and remote-service failures are recovered inside the session and
//! never reach this type; see [`crate::storage::StorageError`] and
//! [`crate::remote::RemoteError`].

use crate::eligibility::Eligibility;
use crate::messages;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionError {
    /// Catalog fetch failed or the document was malformed; prediction
    /// requests stay disabled for the session
    #[error("Prediction catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Catalog has no selectable category
    #[error("No categories available")]
    NoCategoriesAvailable,

    /// Slot already claimed
    #[error("Not eligible in the {} slot", .0.slot)]
    NotEligible(Eligibility),
}

impl PredictionError {
    /// Localized text for the prediction display area
    pub fn user_message(&self) -> &'static str {
        match self {
            PredictionError::CatalogUnavailable(_) => messages::CATALOG_UNAVAILABLE,
            PredictionError::NoCategoriesAvailable => messages::NO_CATEGORIES,
            PredictionError::NotEligible(eligibility) => messages::message_for(eligibility),
        }
    }
}

/// Result type for session operations
pub type PredictionResult<T> = Result<T, PredictionError>;
