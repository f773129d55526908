// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The report printed once a run is over.

use super::{displayer::formatters::DisplayElapsed, helpers::Styles};
use crate::{
    collector::{Counts, PackageResult, Run, Status, TestResult},
    helpers::{ThemeCharacters, plural},
};
use owo_colors::OwoColorize;
use std::time::Duration;
use swrite::{SWrite, swrite, swriteln};

/// The default threshold above which a test is reported as slow.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(500);

/// Tests from a single package, in the order they were first seen.
#[derive(Clone, Debug)]
pub struct PackageGroup<'a> {
    /// The package.
    pub package: &'a PackageResult,
    /// The selected tests in this package.
    pub tests: Vec<&'a TestResult>,
}

/// Statistics computed from a finished run.
#[derive(Clone, Debug)]
pub struct RunSummary<'a> {
    /// The run these statistics describe.
    pub run: &'a Run,

    /// Packages with failures: either failed tests, or a failed package with no failed tests
    /// (for example, a build failure).
    pub failures: Vec<PackageGroup<'a>>,

    /// Packages with skipped tests.
    pub skipped: Vec<PackageGroup<'a>>,

    /// Tests at least as slow as the threshold, slowest first.
    pub slow_tests: Vec<&'a TestResult>,

    /// The package with the shortest elapsed time.
    pub fastest: Option<&'a PackageResult>,

    /// The package with the longest elapsed time.
    pub slowest: Option<&'a PackageResult>,

    /// The package with the most tests.
    pub most_tested: Option<&'a PackageResult>,
}

impl<'a> RunSummary<'a> {
    /// Computes statistics for `run`.
    pub fn new(run: &'a Run, slow_threshold: Duration) -> Self {
        let mut failures = Vec::new();
        let mut skipped = Vec::new();
        let mut slow_tests: Vec<&TestResult> = Vec::new();

        for package in run.packages.values() {
            let tests: Vec<_> = run.tests_in(package).collect();

            let failed: Vec<_> = tests
                .iter()
                .copied()
                .filter(|test| test.status == Status::Failed)
                .collect();
            if !failed.is_empty() || package.status == Status::Failed {
                failures.push(PackageGroup {
                    package,
                    tests: failed,
                });
            }

            let skipped_tests: Vec<_> = tests
                .iter()
                .copied()
                .filter(|test| test.status == Status::Skipped)
                .collect();
            if !skipped_tests.is_empty() {
                skipped.push(PackageGroup {
                    package,
                    tests: skipped_tests,
                });
            }

            slow_tests.extend(
                tests
                    .iter()
                    .copied()
                    .filter(|test| test.elapsed >= slow_threshold),
            );
        }
        // Stable, so ties stay in the order they were seen.
        slow_tests.sort_by(|a, b| b.elapsed.cmp(&a.elapsed));

        // Seed each scan with the first package and only replace it on a strict improvement, so
        // ties go to the package seen first.
        let mut packages = run.packages.values();
        let (mut fastest, mut slowest, mut most_tested) = match packages.next() {
            Some(first) => (Some(first), Some(first), Some(first)),
            None => (None, None, None),
        };
        for package in packages {
            if fastest.is_some_and(|fastest| package.elapsed < fastest.elapsed) {
                fastest = Some(package);
            }
            if slowest.is_some_and(|slowest| package.elapsed > slowest.elapsed) {
                slowest = Some(package);
            }
            if most_tested
                .is_some_and(|most| package.test_order.len() > most.test_order.len())
            {
                most_tested = Some(package);
            }
        }

        Self {
            run,
            failures,
            skipped,
            slow_tests,
            fastest,
            slowest,
            most_tested,
        }
    }

    /// Returns the aggregate test counts.
    pub fn counts(&self) -> &Counts {
        &self.run.counts
    }

    /// Returns the total run duration, or zero if the run hasn't ended.
    pub fn duration(&self) -> Duration {
        self.run.duration().unwrap_or_default()
    }
}

/// Formats the final report for a run.
#[derive(Clone, Debug)]
pub struct SummaryFormatter {
    styles: Box<Styles>,
    theme_characters: ThemeCharacters,
    slow_threshold: Duration,
}

impl SummaryFormatter {
    /// Creates a new formatter.
    pub fn new(should_colorize: bool, use_unicode: bool, slow_threshold: Duration) -> Self {
        let mut styles: Box<Styles> = Box::default();
        if should_colorize {
            styles.colorize();
        }
        let mut theme_characters = ThemeCharacters::default();
        if use_unicode {
            theme_characters.use_unicode();
        }
        Self {
            styles,
            theme_characters,
            slow_threshold,
        }
    }

    /// Formats the report for `run`. The result ends with a newline.
    pub fn format(&self, run: &Run) -> String {
        let summary = RunSummary::new(run, self.slow_threshold);
        let mut out = String::new();

        if !summary.failures.is_empty() {
            self.write_heading(&mut out, "Failures");
            for group in &summary.failures {
                swriteln!(out, "{}", group.package.name.style(self.styles.fail));
                if group.tests.is_empty() {
                    let label = group
                        .package
                        .output
                        .as_deref()
                        .unwrap_or("package failed");
                    swriteln!(
                        out,
                        "  {} {label}",
                        self.theme_characters.fail_icon().style(self.styles.fail),
                    );
                }
                for test in &group.tests {
                    swriteln!(
                        out,
                        "  {} {} ({})",
                        self.theme_characters.fail_icon().style(self.styles.fail),
                        test.name,
                        DisplayElapsed(test.elapsed),
                    );
                    for line in &test.output {
                        swriteln!(out, "    {line}");
                    }
                }
            }
            out.push('\n');
        }

        if !summary.skipped.is_empty() {
            self.write_heading(&mut out, "Skipped");
            for group in &summary.skipped {
                swriteln!(out, "{}", group.package.name);
                for test in &group.tests {
                    swriteln!(
                        out,
                        "  {} {}",
                        self.theme_characters.skip_icon().style(self.styles.skip),
                        test.name,
                    );
                }
            }
            out.push('\n');
        }

        if !summary.slow_tests.is_empty() {
            let heading = format!("Slow Tests (>= {})", DisplayElapsed(self.slow_threshold));
            self.write_heading(&mut out, &heading);
            let width = summary
                .slow_tests
                .iter()
                .map(|test| DisplayElapsed(test.elapsed).to_string().len())
                .max()
                .unwrap_or_default();
            for test in &summary.slow_tests {
                swriteln!(
                    out,
                    "  {:>width$}  {} {}",
                    DisplayElapsed(test.elapsed).style(self.styles.count),
                    test.package,
                    test.name,
                );
            }
            out.push('\n');
        }

        self.write_heading(&mut out, "Packages");
        self.write_packages(&mut out, &summary);
        out.push('\n');

        self.write_heading(&mut out, "Overall Results");
        self.write_overall(&mut out, &summary);

        out
    }

    fn write_heading(&self, out: &mut String, title: &str) {
        swriteln!(out, "{}", title.style(self.styles.heading));
        swriteln!(
            out,
            "{}",
            self.theme_characters.hbar(title.chars().count())
        );
    }

    fn write_packages(&self, out: &mut String, summary: &RunSummary<'_>) {
        let count = summary.run.packages.len();
        let (Some(fastest), Some(slowest), Some(most_tested)) =
            (summary.fastest, summary.slowest, summary.most_tested)
        else {
            swriteln!(out, "  no packages ran");
            return;
        };

        swriteln!(
            out,
            "  {} {} ran",
            count.style(self.styles.count),
            plural::packages_str(count),
        );
        swriteln!(
            out,
            "  fastest:    {} ({})",
            fastest.name,
            DisplayElapsed(fastest.elapsed)
        );
        swriteln!(
            out,
            "  slowest:    {} ({})",
            slowest.name,
            DisplayElapsed(slowest.elapsed)
        );
        let tests = most_tested.test_order.len();
        swriteln!(
            out,
            "  most tests: {} ({} {})",
            most_tested.name,
            tests,
            plural::tests_str(tests),
        );
    }

    fn write_overall(&self, out: &mut String, summary: &RunSummary<'_>) {
        let counts = summary.counts();
        let status = summary.run.status;
        let total = counts.total();
        swrite!(
            out,
            "  {} {} {} run: {} passed, {} failed, {} skipped",
            status.summary_word().style(self.styles.for_status(status)),
            total.style(self.styles.count),
            plural::tests_str(total),
            counts.passed.style(self.styles.pass),
            counts.failed.style(self.styles.fail),
            counts.skipped.style(self.styles.skip),
        );
        if counts.running > 0 {
            swrite!(
                out,
                ", {} still running",
                counts.running.style(self.styles.running)
            );
        }
        swriteln!(out, " in {}", DisplayElapsed(summary.duration()));
    }
}
