// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{Session, decode_fixture};
use livetest_runner::collector::{CollectorMode, Counts, Run, RunId, Status};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn check_counts(run: &Run) {
    let mut sum = Counts::default();
    for package in run.packages.values() {
        let counts = &package.counts;
        assert_eq!(
            counts.passed + counts.failed + counts.skipped + counts.running,
            package.test_order.len(),
            "counts for {} cover every test",
            package.name
        );
        sum.passed += counts.passed;
        sum.failed += counts.failed;
        sum.skipped += counts.skipped;
        sum.running += counts.running;
    }
    assert_eq!(run.counts, sum, "run counts are the sum of package counts");
}

#[test]
fn passing_stream_is_one_run() {
    let (events, raw_lines) = decode_fixture("passing.jsonl");
    assert_eq!(raw_lines, 0);

    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);

    assert!(session.state().current_run().is_none());
    assert_eq!(session.state().runs().len(), 1);
    let run = session.latest();
    check_counts(run);

    assert_eq!(run.status, Status::Passed);
    assert_eq!(
        run.counts,
        Counts {
            passed: 2,
            failed: 0,
            skipped: 1,
            running: 0,
        }
    );
    assert_eq!(
        run.package_order().collect::<Vec<_>>(),
        ["example.com/calc", "example.com/parse"]
    );
    assert_eq!(run.duration(), Some(Duration::from_secs(1)));

    let calc = run.package("example.com/calc").expect("calc package");
    assert_eq!(calc.status, Status::Passed);
    assert_eq!(calc.elapsed, Duration::from_millis(600));
    // The last non-blank package output wins.
    assert_eq!(calc.output.as_deref(), Some("ok  \texample.com/calc\t0.60s"));

    let tokens = run
        .test_result("example.com/parse", "TestTokens")
        .expect("TestTokens");
    assert_eq!(
        tokens.summary_line.as_deref(),
        Some("--- PASS: TestTokens (0.80s)")
    );
    assert_eq!(tokens.output, ["    tokens_test.go:12: lexing 42 inputs"]);
}

#[test]
fn build_failures_and_test_failures() {
    let (events, raw_lines) = decode_fixture("failing.jsonl");
    // The plain-text build output printed ahead of the JSON stream.
    assert_eq!(raw_lines, 2);

    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);

    assert_eq!(session.state().runs().len(), 1);
    let run = session.latest();
    check_counts(run);
    assert_eq!(run.status, Status::Failed);
    assert_eq!(
        run.non_test_output,
        [
            "# example.com/broken",
            "broken/broken.go:3:8: undefined: missing"
        ]
    );

    let broken = run.package("example.com/broken").expect("broken package");
    assert_eq!(broken.status, Status::Failed);
    assert!(broken.test_order.is_empty());
    assert_eq!(
        broken.output.as_deref(),
        Some("FAIL\texample.com/broken [build failed]")
    );

    let put = run
        .test_result("example.com/store", "TestPut")
        .expect("TestPut");
    assert_eq!(put.status, Status::Failed);
    assert_eq!(put.elapsed, Duration::from_millis(600));
    assert_eq!(put.output, [r#"    store_test.go:21: got "b", want "a""#]);
}

#[test]
fn sequential_invocations_are_separate_runs() {
    let (events, _) = decode_fixture("two-runs.jsonl");
    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);

    let runs = session.state().runs();
    assert!(session.state().current_run().is_none());
    assert_eq!(
        runs.iter().map(|run| (run.id, run.status)).collect::<Vec<_>>(),
        [(RunId(1), Status::Passed), (RunId(2), Status::Failed)]
    );
    for run in runs {
        check_counts(run);
    }
}

#[test]
fn truncated_stream_is_interrupted_on_finish() {
    let (events, _) = decode_fixture("truncated.jsonl");
    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);

    let run = session.state().current_run().expect("run still going");
    assert_eq!(run.running_pkgs, 1);
    assert_eq!(
        run.package("example.com/dns").expect("dns").status,
        Status::Passed
    );

    session.clock.advance(Duration::from_secs(2));
    session.collector.finish();

    assert!(session.state().current_run().is_none());
    let run = session.latest();
    check_counts(run);
    assert_eq!(run.status, Status::Interrupted);
    assert_eq!(run.duration(), Some(Duration::from_secs(3)));

    let net = run.package("example.com/net").expect("net");
    assert_eq!(net.status, Status::Interrupted);
    assert_eq!(net.elapsed, Duration::from_secs(3));
    // Tests are left as they were.
    assert_eq!(
        run.test_result("example.com/net", "TestDial")
            .expect("TestDial")
            .status,
        Status::Running
    );
}
