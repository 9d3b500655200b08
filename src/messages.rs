//! User-facing texts, in the language of the catalog.

use crate::eligibility::{Eligibility, IneligibleReason};

pub const LOADING: &str = "Загрузка предсказаний...";
pub const ASK: &str = "спросить";
pub const CHOOSE_CATEGORY: &str = "Выберите категорию или испытайте удачу:";
pub const LUCKY: &str = "На удачу";
pub const CATALOG_UNAVAILABLE: &str = "Не удалось загрузить предсказания. Попробуйте позже.";
pub const NO_CATEGORIES: &str = "Нет доступных категорий для предсказания.";
pub const ALREADY_CLAIMED_MORNING: &str =
    "Вы уже получили предсказание сегодня утром. Попробуйте после 12:00.";
pub const ALREADY_CLAIMED_TODAY: &str = "Вы уже получили предсказание сегодня. Попробуйте завтра!";

/// Text shown after an eligibility check
pub fn message_for(eligibility: &Eligibility) -> &'static str {
    match eligibility.reason {
        None => CHOOSE_CATEGORY,
        Some(IneligibleReason::AlreadyClaimedMorning) => ALREADY_CLAIMED_MORNING,
        Some(IneligibleReason::AlreadyClaimedToday) => ALREADY_CLAIMED_TODAY,
    }
}
