// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{Session, decode_fixture, read_fixture};
use livetest_runner::{
    collector::CollectorMode,
    reporter::{Renderer, RendererBuilder, SummaryFormatter},
    runner::{EventSourceBuilder, LiveRunnerBuilder, RunOutcome, TerminalSize},
    signal::SignalHandlerKind,
    time::{Clock, ManualClock},
};
use std::{io::Cursor, time::Duration};

fn renderer(should_colorize: bool) -> Renderer {
    RendererBuilder {
        should_colorize,
        ..RendererBuilder::default()
    }
    .build()
}

fn truncated_session() -> Session {
    let (events, _) = decode_fixture("truncated.jsonl");
    let mut session = Session::new(CollectorMode::Live);
    session.push_all(events);
    session
}

#[test]
fn running_package_expands_with_output() {
    let session = truncated_session();
    let run = session.state().current_run().expect("run in progress");
    let frame = renderer(false).render(run, 60, 20, None, session.clock.now());
    let lines: Vec<_> = frame.lines().collect();

    assert!(lines.len() <= 20);
    assert!(lines[0].contains("example.com/net"), "{frame}");
    assert!(lines[1].contains("=== RUN   TestDial"), "{frame}");
    assert!(lines[2].contains("dial_test.go:40: dialing 127.0.0.1:9"), "{frame}");
    assert!(lines[3].starts_with("+ example.com/dns"), "{frame}");
    // Finished packages don't list their tests.
    assert!(!frame.contains("TestLookup"), "{frame}");
    assert!(lines.last().expect("summary line").starts_with("RUNNING"));
    for line in &lines {
        assert!(
            unicode_width::UnicodeWidthStr::width(*line) <= 60,
            "line too wide: {line:?}"
        );
    }
}

#[test]
fn small_terminal_drops_output_first() {
    let session = truncated_session();
    let run = session.state().current_run().expect("run in progress");

    // Two package lines, the separator and the summary leave one line for TestDial.
    let frame = renderer(false).render(run, 60, 5, None, session.clock.now());
    assert_eq!(frame.lines().count(), 5, "{frame}");
    assert!(frame.contains("TestDial"), "{frame}");
    assert!(!frame.contains("dial_test.go"), "{frame}");

    // Below the fixed cost, the summary line still survives.
    let frame = renderer(false).render(run, 60, 2, None, session.clock.now());
    let lines: Vec<_> = frame.lines().collect();
    assert_eq!(lines.len(), 2, "{frame}");
    assert!(lines[1].starts_with("RUNNING"), "{frame}");
}

#[test]
fn styled_lines_end_with_reset() {
    let session = truncated_session();
    let run = session.state().current_run().expect("run in progress");
    let frame = renderer(true).render(run, 40, 20, None, session.clock.now());
    for line in frame.lines() {
        if line.contains('\u{1b}') {
            assert!(line.ends_with("\u{1b}[0m"), "unterminated style: {line:?}");
        }
    }
    assert!(!frame.contains('\t'), "tabs are expanded");
}

#[test]
fn build_output_heads_the_frame() {
    let (events, _) = decode_fixture("failing.jsonl");
    let mut session = Session::new(CollectorMode::Live);
    // Stop before the store package finishes.
    let events: Vec<_> = events.into_iter().take(9).collect();
    session.push_all(events);

    let run = session.state().current_run().expect("run in progress");
    let frame = renderer(false).render(run, 80, 30, None, session.clock.now());
    let lines: Vec<_> = frame.lines().collect();
    assert_eq!(lines[0], "# example.com/broken");
    assert_eq!(lines[1], "broken/broken.go:3:8: undefined: missing");
    assert_eq!(lines[2], "");
    assert!(
        frame.contains("x FAIL    example.com/broken [build failed]"),
        "{frame}"
    );
}

#[tokio::test]
async fn live_runner_reports_each_run() {
    let input = Cursor::new(read_fixture("two-runs.jsonl").into_bytes());
    let source = EventSourceBuilder {
        raw_output: None,
        replay_rate: None,
        channel_capacity: 4,
    }
    .spawn_reader(input, "two-runs.jsonl".to_owned())
    .await
    .expect("source spawned");

    let clock = ManualClock::new(crate::fixtures::timestamp("2024-05-01T12:00:00Z"));
    let mut runner = LiveRunnerBuilder {
        renderer: renderer(false),
        summary: SummaryFormatter::new(false, false, Duration::from_millis(500)),
        mode: CollectorMode::Live,
        tick_interval: Duration::from_millis(100),
        signal_handler: SignalHandlerKind::Noop,
    }
    .build_with_clock(Vec::new(), false, clock)
    .with_terminal_size(|| TerminalSize {
        width: 80,
        height: 24,
    });

    let outcome = runner.run(source).await.expect("run succeeded");
    assert_eq!(
        outcome,
        RunOutcome {
            runs: 2,
            failed: true,
            interrupted: false,
            signalled: false,
        }
    );

    let output = String::from_utf8(runner.into_inner()).expect("output is UTF-8");
    let overall: Vec<_> = output
        .lines()
        .filter(|line| line.contains(" run: "))
        .collect();
    assert_eq!(overall.len(), 2, "{output}");
    assert!(overall[0].contains("PASSED 1 test run"), "{output}");
    assert!(overall[1].contains("FAILED 1 test run"), "{output}");
}
