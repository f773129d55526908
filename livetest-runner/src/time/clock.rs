// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Timestamp, add_duration};
use chrono::Local;
use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

/// A source of wall-clock time.
pub trait Clock: fmt::Debug {
    /// Returns the current wall-clock time.
    fn now(&self) -> Timestamp;
}

/// A [`Clock`] backed by the system clock, in the local time zone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().fixed_offset()
    }
}

/// A [`Clock`] that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and hand another to a
/// [`Collector`](crate::collector::Collector).
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Creates a new manual clock starting at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = add_duration(*now, duration);
    }

    /// Sets the clock to `timestamp`.
    pub fn set(&self, timestamp: Timestamp) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now = timestamp;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn manual_clock_clones_share_time() {
        let start = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").expect("valid");
        let clock = ManualClock::new(start);
        let other = clock.clone();
        clock.advance(Duration::from_secs(3));
        assert_eq!(
            other.now(),
            DateTime::parse_from_rfc3339("2024-05-01T12:00:03Z").expect("valid")
        );
    }
}
