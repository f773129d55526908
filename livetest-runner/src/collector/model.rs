// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::time::Timestamp;
use indexmap::IndexMap;
use std::{collections::HashMap, fmt, time::Duration};

/// The status of a test, package or run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Nothing is known yet.
    #[default]
    Unknown,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Passed,
    /// Finished with a failure.
    Failed,
    /// Skipped.
    Skipped,
    /// The stream ended while this was still running.
    Interrupted,
    /// Paused, waiting to resume (for example, a parallel test waiting for its turn).
    Paused,
}

impl Status {
    /// Returns true if no further transitions can occur from this status.
    pub fn is_terminal(self) -> bool {
        match self {
            Self::Passed | Self::Failed | Self::Skipped | Self::Interrupted => true,
            Self::Unknown | Self::Running | Self::Paused => false,
        }
    }

    /// Returns the upper-case word used for this status in run summaries.
    pub fn summary_word(self) -> &'static str {
        match self {
            Self::Running | Self::Paused => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::Interrupted => "INTERRUPTED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Interrupted => "interrupted",
            Self::Paused => "paused",
        };
        f.write_str(s)
    }
}

/// Per-status test counts for a package or a run.
///
/// `running` counts every test that hasn't reached a terminal status yet, including paused ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// Tests that passed.
    pub passed: usize,
    /// Tests that failed.
    pub failed: usize,
    /// Tests that were skipped.
    pub skipped: usize,
    /// Tests that have not finished.
    pub running: usize,
}

impl Counts {
    /// Returns the total number of tests counted.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.running
    }

    /// Moves one test out of `running` into the bucket for `status`.
    ///
    /// Statuses without a bucket (anything that isn't passed, failed or skipped) leave the counts
    /// unchanged.
    pub(super) fn record_finished(&mut self, status: Status) {
        let bucket = match status {
            Status::Passed => &mut self.passed,
            Status::Failed => &mut self.failed,
            Status::Skipped => &mut self.skipped,
            Status::Unknown | Status::Running | Status::Interrupted | Status::Paused => return,
        };
        *bucket += 1;
        self.running = self.running.saturating_sub(1);
    }
}

/// Identifies a test within a run.
///
/// Both Go package paths and subtest names contain slashes, so the key is kept structured rather
/// than joined into a single string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestKey {
    /// The package the test belongs to.
    pub package: String,
    /// The test name.
    pub test: String,
}

impl TestKey {
    /// Creates a new key.
    pub fn new(package: impl Into<String>, test: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            test: test.into(),
        }
    }
}

impl fmt::Display for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.test)
    }
}

/// The state of a single test within a run.
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    /// The package this test belongs to.
    pub package: String,

    /// The test name, including any subtest path.
    pub name: String,

    /// The current status.
    pub status: Status,

    /// The event time at which the test was first seen.
    pub start_time: Timestamp,

    /// The wall-clock time at which the test was first seen.
    pub wall_start_time: Timestamp,

    /// The elapsed time reported by the terminal event, or zero if not finished.
    pub elapsed: Duration,

    /// Output lines, in order. Not bounded: windowing is up to the renderer.
    pub output: Vec<String>,

    /// The most recent `=== ` or `--- ` status line printed for this test.
    pub summary_line: Option<String>,
}

/// The state of a single package within a run.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageResult {
    /// The package import path.
    pub name: String,

    /// The current status.
    pub status: Status,

    /// The event time at which the package was first seen.
    pub start_time: Timestamp,

    /// The wall-clock time at which the package was first seen.
    pub wall_start_time: Timestamp,

    /// The elapsed time reported by the terminal event (or estimated on interruption).
    pub elapsed: Duration,

    /// Test counts for this package.
    pub counts: Counts,

    /// The last non-empty line of package-level output. Each new line replaces the previous one.
    pub output: Option<String>,

    /// Test names, in the order they were first seen.
    pub test_order: Vec<String>,
}

/// A run identifier. Runs are numbered from 1 in the order they start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One inferred invocation of the test runner.
#[derive(Clone, Debug, PartialEq)]
pub struct Run {
    /// The run identifier.
    pub id: RunId,

    /// Packages, in the order they were first seen.
    pub packages: IndexMap<String, PackageResult>,

    /// Tests, keyed by package and test name.
    pub test_results: HashMap<TestKey, TestResult>,

    /// Aggregate test counts across all packages.
    pub counts: Counts,

    /// The number of packages whose status is [`Status::Running`].
    pub running_pkgs: usize,

    /// Build output and other lines not attributed to a package.
    pub non_test_output: Vec<String>,

    /// The event time of the first event in this run.
    pub start_time: Timestamp,

    /// The wall-clock time at which the first event in this run was observed.
    pub wall_start_time: Timestamp,

    /// The event time of the most recent event in this run.
    pub last_event_time: Timestamp,

    /// The time at which this run ended, or `None` if it's still current.
    pub end_time: Option<Timestamp>,

    /// The overall status.
    pub status: Status,
}

impl Run {
    pub(super) fn new(id: RunId, start_time: Timestamp, wall_start_time: Timestamp) -> Self {
        Self {
            id,
            packages: IndexMap::new(),
            test_results: HashMap::new(),
            counts: Counts::default(),
            running_pkgs: 0,
            non_test_output: Vec::new(),
            start_time,
            wall_start_time,
            last_event_time: start_time,
            end_time: None,
            status: Status::Running,
        }
    }

    /// Returns the package names in first-seen order.
    pub fn package_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.packages.keys().map(|name| name.as_str())
    }

    /// Looks up a package by name.
    pub fn package(&self, name: &str) -> Option<&PackageResult> {
        self.packages.get(name)
    }

    /// Looks up a test by package and test name.
    pub fn test_result(&self, package: &str, test: &str) -> Option<&TestResult> {
        self.test_results.get(&TestKey::new(package, test))
    }

    /// Returns the tests of `package` in first-seen order.
    pub fn tests_in<'a>(
        &'a self,
        package: &'a PackageResult,
    ) -> impl Iterator<Item = &'a TestResult> + 'a {
        package
            .test_order
            .iter()
            .filter_map(move |test| self.test_result(&package.name, test))
    }

    /// Returns true if any test or package in this run failed.
    pub fn has_failures(&self) -> bool {
        self.counts.failed > 0
            || self
                .packages
                .values()
                .any(|package| package.status == Status::Failed)
    }

    /// Returns the total run duration, if the run has ended.
    pub fn duration(&self) -> Option<Duration> {
        self.end_time
            .map(|end_time| crate::time::duration_between(self.start_time, end_time))
    }
}

/// The full reducer state: every run observed so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    runs: Vec<Run>,
    current: Option<usize>,
}

impl State {
    /// Returns all runs, oldest first.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Returns the run currently in progress, if any.
    pub fn current_run(&self) -> Option<&Run> {
        self.current.map(|index| &self.runs[index])
    }

    /// Returns the most recent run, whether or not it has finished.
    pub fn latest_run(&self) -> Option<&Run> {
        self.runs.last()
    }

    pub(super) fn current_run_mut(&mut self) -> Option<&mut Run> {
        match self.current {
            Some(index) => Some(&mut self.runs[index]),
            None => None,
        }
    }

    pub(super) fn start_run(&mut self, start_time: Timestamp, wall_start_time: Timestamp) {
        let id = RunId(self.runs.len() as u64 + 1);
        self.runs.push(Run::new(id, start_time, wall_start_time));
        self.current = Some(self.runs.len() - 1);
    }

    pub(super) fn clear_current(&mut self) {
        self.current = None;
    }
}
