//! History Rotation
//!
//! Keeps the month-scoped, size-bounded window of recently shown texts and
//! uses it to avoid immediate repeats.
//!
//! ## Cycle
//!
//! ```text
//! stored stats
//!     ↓
//! normalize_for_month   → history cleared on a new month
//!     ↓
//! select_prediction     → fresh text if any, else any text of the category
//!     ↓
//! push_bounded          → oldest entries evicted past the bound
//! ```

use crate::catalog::PredictionCatalog;
use crate::clock::month_string;
use crate::error::PredictionError;
use crate::stats::UserStats;
use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shown when a category cannot produce a text
pub const NO_PREDICTION_TEXT: &str = "Не удалось получить предсказание для этой категории.";

/// Result of [`select_prediction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    /// False when the fallback text was substituted
    pub from_catalog: bool,
    /// True when every candidate had been shown this month
    pub repeated: bool,
}

/// Reset the history when `now` is in a different month.
///
/// Returns the stats and whether anything changed. Idempotent for a
/// given `now`; the play dates are never touched.
pub fn normalize_for_month(mut stats: UserStats, now: NaiveDateTime) -> (UserStats, bool) {
    let month = month_string(now);
    if stats.predictions_month == month {
        return (stats, false);
    }

    tracing::debug!(
        from = %stats.predictions_month,
        to = %month,
        dropped = stats.shown_predictions.len(),
        "new month, clearing shown predictions"
    );
    stats.shown_predictions.clear();
    stats.predictions_month = month;
    (stats, true)
}

/// Pick a text from `category` while avoiding texts already shown.
///
/// An unknown or empty category yields [`NO_PREDICTION_TEXT`] and leaves
/// the history untouched. When the whole category has been shown the pick
/// falls back to the full list so an exhausted category never blocks a
/// play.
pub fn select_prediction<R: Rng + ?Sized>(
    catalog: &PredictionCatalog,
    category: &str,
    mut stats: UserStats,
    max_shown: usize,
    rng: &mut R,
) -> (Selection, UserStats) {
    let candidates = match catalog.predictions(category) {
        Some(texts) if !texts.is_empty() => texts,
        _ => {
            tracing::warn!(category, "no predictions for category");
            let fallback = Selection {
                text: NO_PREDICTION_TEXT.to_string(),
                from_catalog: false,
                repeated: false,
            };
            return (fallback, stats);
        }
    };

    let fresh: Vec<&String> = candidates
        .iter()
        .filter(|text| !stats.has_shown(text))
        .collect();
    let repeated = fresh.is_empty();

    let chosen = if repeated {
        tracing::debug!(category, "category exhausted this month, repeating");
        candidates.choose(rng)
    } else {
        fresh.choose(rng).copied()
    };
    // candidates is non-empty, so a choice always exists
    let text = chosen.cloned().unwrap_or_default();

    push_bounded(&mut stats.shown_predictions, text.clone(), max_shown);
    let selection = Selection {
        text,
        from_catalog: true,
        repeated,
    };
    (selection, stats)
}

/// Append `text`, evicting from the front until `len <= max`.
pub fn push_bounded(history: &mut Vec<String>, text: String, max: usize) {
    history.push(text);
    if history.len() > max {
        let excess = history.len() - max;
        history.drain(..excess);
    }
}

/// Pick a category uniformly among the selectable ones.
pub fn choose_random_category<'a, R: Rng + ?Sized>(
    catalog: &'a PredictionCatalog,
    rng: &mut R,
) -> Result<&'a str, PredictionError> {
    catalog
        .categories()
        .choose(rng)
        .copied()
        .ok_or(PredictionError::NoCategoriesAvailable)
}
