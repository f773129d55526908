// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{Session, decode_fixture};
use indoc::indoc;
use livetest_runner::{
    collector::CollectorMode,
    reporter::{DEFAULT_SLOW_THRESHOLD, RunSummary, SummaryFormatter},
};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn finished_session(name: &str) -> Session {
    let (events, _) = decode_fixture(name);
    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);
    session.collector.finish();
    session
}

#[test]
fn passing_summary() {
    let session = finished_session("passing.jsonl");
    let formatter = SummaryFormatter::new(false, false, DEFAULT_SLOW_THRESHOLD);

    assert_eq!(
        formatter.format(session.latest()),
        indoc! {"
            Skipped
            -------
            example.com/calc
              ~ TestDiv

            Slow Tests (>= 0.5s)
            --------------------
              0.8s  example.com/parse TestTokens

            Packages
            --------
              2 packages ran
              fastest:    example.com/calc (0.6s)
              slowest:    example.com/parse (1.0s)
              most tests: example.com/calc (2 tests)

            Overall Results
            ---------------
              PASSED 3 tests run: 2 passed, 0 failed, 1 skipped in 1.0s
        "}
    );
}

#[test]
fn failing_summary_lists_build_failures() {
    let session = finished_session("failing.jsonl");
    let run = session.latest();

    let summary = RunSummary::new(run, DEFAULT_SLOW_THRESHOLD);
    let failed_packages: Vec<_> = summary
        .failures
        .iter()
        .map(|group| (group.package.name.as_str(), group.tests.len()))
        .collect();
    assert_eq!(
        failed_packages,
        [("example.com/store", 1), ("example.com/broken", 0)]
    );

    let formatter = SummaryFormatter::new(false, false, DEFAULT_SLOW_THRESHOLD);
    let text = formatter.format(run);
    assert!(
        text.starts_with(indoc! {"
            Failures
            --------
            example.com/store
              x TestPut (0.6s)
                    store_test.go:21: got \"b\", want \"a\"
            example.com/broken
              x FAIL\texample.com/broken [build failed]
        "}),
        "{text}"
    );
    assert!(
        text.ends_with("  FAILED 1 test run: 0 passed, 1 failed, 0 skipped in 0.8s\n"),
        "{text}"
    );
}

#[test]
fn interrupted_summary_reports_running_tests() {
    let (events, _) = decode_fixture("truncated.jsonl");
    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);
    session.clock.advance(Duration::from_secs(2));
    session.collector.finish();

    let formatter = SummaryFormatter::new(false, false, Duration::from_secs(10));
    let text = formatter.format(session.latest());
    assert!(!text.contains("Slow Tests"), "{text}");
    assert!(
        text.ends_with(
            "  INTERRUPTED 2 tests run: 1 passed, 0 failed, 0 skipped, 1 still running in 3.0s\n"
        ),
        "{text}"
    );
}
