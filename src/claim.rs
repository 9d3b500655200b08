//! Quota consumption.

use crate::clock::date_string;
use crate::eligibility::Slot;
use crate::stats::UserStats;
use chrono::NaiveDateTime;

/// Mark the slot containing `now` as claimed today.
///
/// Debug plays never consume quota; the stats are still returned so a
/// history or month change made in the same cycle gets persisted.
pub fn record_claim(mut stats: UserStats, now: NaiveDateTime, debug_bypass: bool) -> UserStats {
    if debug_bypass {
        tracing::debug!("debug play, quota untouched");
        return stats;
    }

    let today = date_string(now);
    match Slot::at(now) {
        Slot::AM => stats.last_play_am = today,
        Slot::PM => stats.last_play_pm = today,
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_morning_claim_sets_am_only() {
        let stats = record_claim(UserStats::default(), at(9), false);
        assert_eq!(stats.last_play_am, "2024-06-15");
        assert!(stats.last_play_pm.is_empty());
    }

    #[test]
    fn test_afternoon_claim_sets_pm_only() {
        let before = UserStats {
            last_play_am: "2024-06-15".to_string(),
            ..UserStats::default()
        };
        let stats = record_claim(before, at(12), false);
        assert_eq!(stats.last_play_am, "2024-06-15");
        assert_eq!(stats.last_play_pm, "2024-06-15");
    }

    #[test]
    fn test_debug_claim_keeps_dates() {
        let before = UserStats {
            last_play_pm: "2024-06-01".to_string(),
            shown_predictions: vec!["A".to_string()],
            ..UserStats::default()
        };
        let stats = record_claim(before.clone(), at(20), true);
        assert_eq!(stats, before);
    }
}
