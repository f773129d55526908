// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time handling: timestamps, clocks, and replay-rate scaling.
//!
//! Two notions of time coexist in livetest:
//!
//! * *Event time*, the `Time` field stamped by the test runner on each event.
//! * *Wall time*, the moment livetest observed the event. In live mode the two are close to each
//!   other, but in replay mode event times are historical and wall time is the only thing that
//!   advances in step with the display.
//!
//! Both are represented as [`Timestamp`]s. Wall time comes from a [`Clock`], so tests can drive
//! it deterministically.

mod clock;

pub use clock::*;

use chrono::{DateTime, FixedOffset, TimeDelta};
use std::time::Duration;

/// A point in time, with the offset from UTC it was recorded in.
pub type Timestamp = DateTime<FixedOffset>;

/// Returns the non-negative duration from `earlier` to `later`.
///
/// Negative spans (for example, out-of-order timestamps) are clamped to zero.
pub fn duration_between(earlier: Timestamp, later: Timestamp) -> Duration {
    (later - earlier).to_std().unwrap_or_default()
}

/// Converts a duration in seconds, as reported in `Elapsed` fields, to a [`Duration`].
///
/// Negative, NaN or otherwise unrepresentable values become zero.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds).unwrap_or_default()
}

/// Converts a wall-clock duration observed during a replay back into original time.
///
/// The replay rate multiplies the delay between events: at rate 0.5 events are replayed twice as
/// fast, so one wall-clock second corresponds to two seconds of original time. `None`, zero and
/// non-finite rates leave the duration unchanged.
pub fn rescale(duration: Duration, replay_rate: Option<f64>) -> Duration {
    match replay_rate {
        Some(rate) if rate > 0.0 && rate.is_finite() => {
            Duration::try_from_secs_f64(duration.as_secs_f64() / rate).unwrap_or(duration)
        }
        _ => duration,
    }
}

/// Scales the original delay between two events by a replay rate, producing the wall-clock time
/// to wait before replaying the second event.
///
/// Zero, negative and non-finite rates mean no delay at all.
pub fn replay_delay(original: Duration, replay_rate: f64) -> Duration {
    if replay_rate > 0.0 && replay_rate.is_finite() {
        Duration::try_from_secs_f64(original.as_secs_f64() * replay_rate).unwrap_or_default()
    } else {
        Duration::ZERO
    }
}

/// Adds a [`Duration`] to a [`Timestamp`], saturating at the input on overflow.
pub fn add_duration(timestamp: Timestamp, duration: Duration) -> Timestamp {
    TimeDelta::from_std(duration)
        .ok()
        .and_then(|delta| timestamp.checked_add_signed(delta))
        .unwrap_or(timestamp)
}
