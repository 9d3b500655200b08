//! Local wall-clock helpers.
//!
//! Every rule here works on the local time of the executing machine; no
//! timezone is configurable.

use chrono::{Local, NaiveDateTime, Timelike};

/// Source of "now" for a session
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant, movable by hand
#[derive(Debug)]
pub struct FixedClock {
    now: parking_lot::Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: parking_lot::Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}

/// Calendar date as `YYYY-MM-DD`
pub fn date_string(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Calendar month as `YYYY-MM`
pub fn month_string(now: NaiveDateTime) -> String {
    now.format("%Y-%m").to_string()
}

/// Whether `now` falls before local noon
pub fn is_morning(now: NaiveDateTime) -> bool {
    now.hour() < 12
}
