// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{Session, decode_fixture, read_fixture};
use livetest_runner::{
    collector::{CollectorMode, Status},
    runner::EventSourceBuilder,
};
use pretty_assertions::assert_eq;
use std::{io::Cursor, time::Duration};
use test_case::test_case;

fn replayed_truncated(rate: f64) -> Session {
    let (events, _) = decode_fixture("truncated.jsonl");
    let mut session = Session::new(CollectorMode::Replay { rate });
    session.push_all(events);
    session
}

#[test_case(0.5 ; "twice as fast")]
#[test_case(1.0 ; "original speed")]
#[test_case(2.0 ; "half speed")]
#[test_case(0.0 ; "no delay")]
fn interrupted_replay_reports_original_time(rate: f64) {
    let mut session = replayed_truncated(rate);
    session.collector.finish();

    let run = session.latest();
    assert_eq!(run.status, Status::Interrupted);
    // The recording spans one second, whatever the replay rate.
    assert_eq!(run.duration(), Some(Duration::from_secs(1)));

    let net = run.package("example.com/net").expect("net");
    assert_eq!(net.status, Status::Interrupted);
    assert_eq!(net.elapsed, Duration::from_secs(1));

    // Finished packages keep the time they reported.
    let dns = run.package("example.com/dns").expect("dns");
    assert_eq!(dns.elapsed, Duration::from_millis(600));
}

#[test]
fn completed_replay_run_ends_on_schedule() {
    let (events, _) = decode_fixture("passing.jsonl");
    let mut session = Session::new(CollectorMode::Replay { rate: 0.25 });
    session.push_all(events);

    let run = session.latest();
    assert_eq!(run.status, Status::Passed);
    assert_eq!(run.duration(), Some(Duration::from_secs(1)));
}

#[tokio::test(start_paused = true)]
async fn source_paces_events() {
    let input = Cursor::new(read_fixture("truncated.jsonl").into_bytes());
    let mut source = EventSourceBuilder {
        raw_output: None,
        replay_rate: Some(0.5),
        channel_capacity: 16,
    }
    .spawn_reader(input, "truncated.jsonl".to_owned())
    .await
    .expect("source spawned");

    let start = tokio::time::Instant::now();
    let mut arrivals = Vec::new();
    while let Some(event) = source.recv().await {
        arrivals.push((event.action, start.elapsed()));
    }
    let stats = source.join().await.expect("reading succeeded");
    assert_eq!(stats.events, 8);

    // The first event goes out immediately; the rest follow at half the recorded gaps.
    assert_eq!(arrivals[0].1, Duration::ZERO);
    let total = arrivals.last().expect("at least one event").1;
    assert!(
        (Duration::from_millis(500)..Duration::from_millis(520)).contains(&total),
        "replay took {total:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn zero_rate_does_not_wait() {
    let input = Cursor::new(read_fixture("two-runs.jsonl").into_bytes());
    let mut source = EventSourceBuilder {
        raw_output: None,
        replay_rate: Some(0.0),
        channel_capacity: 16,
    }
    .spawn_reader(input, "two-runs.jsonl".to_owned())
    .await
    .expect("source spawned");

    let start = tokio::time::Instant::now();
    let mut count = 0;
    while source.recv().await.is_some() {
        count += 1;
    }
    assert_eq!(count, 8);
    assert_eq!(start.elapsed(), Duration::ZERO);
}
