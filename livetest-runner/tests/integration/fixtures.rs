// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use livetest_runner::{
    collector::{Collector, CollectorMode, Run, State},
    event::{DecodedLine, TestEvent, decode_line},
    time::{ManualClock, Timestamp, duration_between, replay_delay},
};

pub(crate) fn fixture_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub(crate) fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read {path}: {err}"))
}

/// Decodes a recorded stream, returning its events and the number of raw lines.
pub(crate) fn decode_fixture(name: &str) -> (Vec<TestEvent>, usize) {
    let mut events = Vec::new();
    let mut raw_lines = 0;
    for line in read_fixture(name).lines() {
        match decode_line(line) {
            DecodedLine::Event(event) => events.push(event),
            DecodedLine::Raw(raw) if raw.trim().is_empty() => {}
            DecodedLine::Raw(_) => raw_lines += 1,
        }
    }
    (events, raw_lines)
}

pub(crate) fn timestamp(s: &str) -> Timestamp {
    chrono::DateTime::parse_from_rfc3339(s).expect("valid timestamp")
}

/// Feeds recorded events into a collector, moving a manual clock the way a real session would.
pub(crate) struct Session {
    pub(crate) collector: Collector<ManualClock>,
    pub(crate) clock: ManualClock,
    previous: Option<Timestamp>,
}

impl Session {
    pub(crate) fn new(mode: CollectorMode) -> Self {
        let clock = ManualClock::new(timestamp("2024-05-01T12:00:00Z"));
        Self {
            collector: Collector::with_clock(mode, clock.clone()),
            clock,
            previous: None,
        }
    }

    /// Pushes `event`. In live mode the clock jumps to the event's own time; in replay mode it
    /// moves forward by the paced delay since the previous event.
    pub(crate) fn push(&mut self, event: TestEvent) {
        match self.collector.mode().replay_rate() {
            None => self.clock.set(event.time),
            Some(rate) => {
                if let Some(previous) = self.previous {
                    self.clock
                        .advance(replay_delay(duration_between(previous, event.time), rate));
                }
            }
        }
        self.previous = Some(event.time);
        self.collector.push(event);
    }

    pub(crate) fn push_all(&mut self, events: impl IntoIterator<Item = TestEvent>) {
        for event in events {
            self.push(event);
        }
    }

    pub(crate) fn state(&self) -> &State {
        self.collector.state()
    }

    pub(crate) fn latest(&self) -> &Run {
        self.state().latest_run().expect("at least one run")
    }
}
