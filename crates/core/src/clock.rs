// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Clock abstraction for testable time handling.

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time.
///
/// WU `created` dates are calendar days (§3: "never a wall-clock
/// instant"), so [`Clock::today`] is the primary accessor for that field;
/// `epoch_ms` backs event/delegation/signal timestamps.
pub trait Clock: Clone + Send + Sync {
    fn epoch_ms(&self) -> u64;
    fn today(&self) -> NaiveDate;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Fake clock for testing with controllable time.
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { epoch_ms: Arc::new(Mutex::new(1_700_000_000_000)) }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.epoch_ms.lock() += duration.as_millis() as u64;
    }

    /// Set the epoch milliseconds value directly.
    pub fn set_epoch_ms(&self, ms: u64) {
        *self.epoch_ms.lock() = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }

    fn today(&self) -> NaiveDate {
        let secs = (self.epoch_ms() / 1000) as i64;
        chrono::DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| unreachable!("epoch_ms always yields an in-range timestamp"))
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
