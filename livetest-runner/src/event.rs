// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test events, as emitted by `go test -json`.
//!
//! Each line of a `go test -json` stream is a JSON object of the form:
//!
//! ```json
//! {"Time":"2024-05-01T12:00:00.1Z","Action":"run","Package":"example.com/pkg","Test":"TestFoo"}
//! ```
//!
//! Lines that aren't events (for example, build output printed by the go tool before the test
//! binary starts, or anything else on the stream) are passed through as
//! [`DecodedLine::Raw`] and never reach the [`Collector`](crate::collector::Collector).

use crate::time::{Timestamp, seconds_to_duration};
use serde::Deserialize;
use std::{fmt, time::Duration};

/// A single structured test event.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestEvent {
    /// The time at which the event was generated, including the offset from UTC.
    pub time: Timestamp,

    /// What happened.
    pub action: Action,

    /// The package this event belongs to. Empty only for some build events.
    #[serde(default)]
    pub package: String,

    /// The test this event belongs to. Empty for package-level events.
    #[serde(default)]
    pub test: String,

    /// Raw output, which may include a trailing newline and ANSI escape codes.
    #[serde(default)]
    pub output: String,

    /// Seconds elapsed, set on terminal actions.
    #[serde(default)]
    pub elapsed: Option<f64>,
}

impl TestEvent {
    /// Creates a new event with no output and no elapsed time.
    pub fn new(
        time: Timestamp,
        action: Action,
        package: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self {
            time,
            action,
            package: package.into(),
            test: test.into(),
            output: String::new(),
            elapsed: None,
        }
    }

    /// Sets the output for this event.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the elapsed time for this event, in seconds.
    pub fn with_elapsed(mut self, elapsed: f64) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// Returns the elapsed time as a [`Duration`], or zero if not set.
    pub fn elapsed_duration(&self) -> Duration {
        self.elapsed.map(seconds_to_duration).unwrap_or_default()
    }
}

/// The kind of a [`TestEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// The test binary for a package is about to start.
    Start,
    /// A test started running.
    Run,
    /// A test was paused (e.g. `t.Parallel()` waiting for its turn).
    Pause,
    /// A paused test continued running.
    Resume,
    /// A line of output.
    Output,
    /// A test or package passed.
    Pass,
    /// A test or package failed.
    Fail,
    /// A test or package was skipped.
    Skip,
    /// A benchmark printed its results.
    Bench,
    /// A line of build output not attributed to a test binary.
    BuildOutput,
    /// The build of a package failed.
    BuildFail,
    /// The build of a package succeeded.
    BuildPass,
    /// An action this version of livetest doesn't know about.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Returns true if this is a build action, which may arrive without a package.
    pub fn is_build(self) -> bool {
        matches!(self, Self::BuildOutput | Self::BuildFail | Self::BuildPass)
    }

    /// Returns the name of this action as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Run => "run",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Output => "output",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Bench => "bench",
            Self::BuildOutput => "build-output",
            Self::BuildFail => "build-fail",
            Self::BuildPass => "build-pass",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of input after decoding.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedLine {
    /// The line was a well-formed event.
    Event(TestEvent),

    /// The line was not an event, and should be passed through as-is.
    Raw(String),
}

/// Decodes a single line of `go test -json` output.
///
/// This never fails: anything that isn't a well-formed event is returned as
/// [`DecodedLine::Raw`].
pub fn decode_line(line: &str) -> DecodedLine {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if !trimmed.trim_start().starts_with('{') {
        return DecodedLine::Raw(trimmed.to_owned());
    }

    match serde_json::from_str::<TestEvent>(trimmed) {
        Ok(event) => DecodedLine::Event(event),
        Err(_) => DecodedLine::Raw(trimmed.to_owned()),
    }
}
