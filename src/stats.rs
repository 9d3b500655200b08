//! Persisted per-user play record.

use serde::{Deserialize, Deserializer, Serialize};

/// Play history stored under the stats key.
///
/// Dates are `YYYY-MM-DD` and the month `YYYY-MM`; an empty string means
/// "never". Missing or `null` JSON fields fall back to their defaults so
/// records written by older revisions still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    #[serde(rename = "lastPlayAM", deserialize_with = "null_as_default")]
    pub last_play_am: String,
    #[serde(rename = "lastPlayPM", deserialize_with = "null_as_default")]
    pub last_play_pm: String,
    /// Most recent last
    #[serde(rename = "shownPredictions", deserialize_with = "null_as_default")]
    pub shown_predictions: Vec<String>,
    #[serde(rename = "predictionsMonth", deserialize_with = "null_as_default")]
    pub predictions_month: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserStats {
    /// Rebuild stats from a stored value.
    ///
    /// An absent, blank, or undecodable value yields the zero record. This
    /// is the recovery path for corrupted storage, not an error.
    pub fn from_stored(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "stored stats unreadable, starting from defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn has_shown(&self, text: &str) -> bool {
        self.shown_predictions.iter().any(|p| p == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let stats = UserStats {
            last_play_am: "2024-06-15".to_string(),
            shown_predictions: vec!["A".to_string()],
            predictions_month: "2024-06".to_string(),
            ..UserStats::default()
        };
        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["lastPlayAM"], "2024-06-15");
        assert_eq!(json["lastPlayPM"], "");
        assert_eq!(json["shownPredictions"][0], "A");
        assert_eq!(json["predictionsMonth"], "2024-06");
    }

    #[test]
    fn test_legacy_record_without_history() {
        let stats = UserStats::from_stored(Some(r#"{"lastPlayPM":"2024-06-14"}"#));
        assert_eq!(stats.last_play_pm, "2024-06-14");
        assert!(stats.last_play_am.is_empty());
        assert!(stats.shown_predictions.is_empty());
    }

    #[test]
    fn test_null_field_keeps_the_rest() {
        let stats = UserStats::from_stored(Some(
            r#"{"lastPlayAM":null,"lastPlayPM":"2024-06-14","shownPredictions":["A"],"predictionsMonth":"2024-06"}"#,
        ));
        assert!(stats.last_play_am.is_empty());
        assert_eq!(stats.last_play_pm, "2024-06-14");
        assert_eq!(stats.shown_predictions, vec!["A".to_string()]);
        assert_eq!(stats.predictions_month, "2024-06");

        let stats = UserStats::from_stored(Some(r#"{"shownPredictions":null,"lastPlayAM":"2024-06-15"}"#));
        assert!(stats.shown_predictions.is_empty());
        assert_eq!(stats.last_play_am, "2024-06-15");
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        assert_eq!(UserStats::from_stored(Some("{not json")), UserStats::default());
        assert_eq!(UserStats::from_stored(Some("")), UserStats::default());
        assert_eq!(UserStats::from_stored(None), UserStats::default());
    }
}
