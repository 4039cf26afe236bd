//! Reference-instant sources.
//!
//! Every classification pass reads "now" exactly once from a [`Clock`], so a
//! pass never straddles two instants.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Mutex;

/// Source of the local wall-clock "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Calendar day of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Device clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock for tests, previews and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
