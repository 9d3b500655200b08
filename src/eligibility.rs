//! Slot gating: may the user ask for a prediction right now?

use crate::clock::{date_string, is_morning};
use crate::stats::UserStats;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Half-day window granting one claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    /// 00:00 - 11:59 local
    AM,
    /// 12:00 - 23:59 local
    PM,
}

impl Slot {
    pub fn at(now: NaiveDateTime) -> Self {
        if is_morning(now) {
            Slot::AM
        } else {
            Slot::PM
        }
    }

    /// Date this slot was last claimed on, empty if never
    pub fn last_play(self, stats: &UserStats) -> &str {
        match self {
            Slot::AM => &stats.last_play_am,
            Slot::PM => &stats.last_play_pm,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::AM => write!(f, "AM"),
            Slot::PM => write!(f, "PM"),
        }
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibleReason {
    /// Morning slot used; the afternoon one opens at 12:00
    AlreadyClaimedMorning,
    /// Afternoon slot used; next chance is tomorrow
    AlreadyClaimedToday,
}

/// Outcome of [`evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub slot: Slot,
    pub reason: Option<IneligibleReason>,
}

impl Eligibility {
    fn granted(slot: Slot) -> Self {
        Self {
            eligible: true,
            slot,
            reason: None,
        }
    }

    fn refused(slot: Slot) -> Self {
        let reason = match slot {
            Slot::AM => IneligibleReason::AlreadyClaimedMorning,
            Slot::PM => IneligibleReason::AlreadyClaimedToday,
        };
        Self {
            eligible: false,
            slot,
            reason: Some(reason),
        }
    }
}

/// Decide eligibility for `now`.
///
/// Pure. `stats` must already be normalized for the current month.
pub fn evaluate(stats: &UserStats, now: NaiveDateTime, debug_bypass: bool) -> Eligibility {
    let slot = Slot::at(now);
    if debug_bypass {
        return Eligibility::granted(slot);
    }

    if slot.last_play(stats) == date_string(now) {
        Eligibility::refused(slot)
    } else {
        Eligibility::granted(slot)
    }
}
