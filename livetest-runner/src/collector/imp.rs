// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Counts, PackageResult, Run, State, Status, TestKey, TestResult};
use crate::{
    event::{Action, TestEvent},
    time::{Clock, SystemClock, Timestamp, add_duration, duration_between, rescale},
};
use std::time::Duration;
use tracing::debug;

/// How a [`Collector`] should interpret time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CollectorMode {
    /// Events are arriving as they are produced.
    #[default]
    Live,

    /// Events are being replayed from a recording, with the original delay between events
    /// multiplied by `rate`.
    ///
    /// A rate of zero means events are replayed without any delay.
    Replay {
        /// The delay multiplier.
        rate: f64,
    },
}

impl CollectorMode {
    /// Returns the replay rate, or `None` in live mode.
    pub fn replay_rate(self) -> Option<f64> {
        match self {
            Self::Live => None,
            Self::Replay { rate } => Some(rate),
        }
    }
}

/// Reduces a stream of [`TestEvent`]s into a [`State`].
///
/// The collector infers run boundaries: a run begins with the first event seen while no run is
/// current, and ends once every package in it has reported a terminal action. A stream that ends
/// early is closed off with [`finish`](Self::finish).
///
/// The collector does no locking and no I/O. All calls to [`push`](Self::push) and
/// [`finish`](Self::finish) must come from a single logical owner.
#[derive(Debug)]
pub struct Collector<C = SystemClock> {
    state: State,
    mode: CollectorMode,
    clock: C,
}

impl Collector<SystemClock> {
    /// Creates a new collector that reads wall-clock time from the system clock.
    pub fn new(mode: CollectorMode) -> Self {
        Self::with_clock(mode, SystemClock)
    }
}

impl<C: Clock> Collector<C> {
    /// Creates a new collector that reads wall-clock time from `clock`.
    pub fn with_clock(mode: CollectorMode, clock: C) -> Self {
        Self {
            state: State::default(),
            mode,
            clock,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the mode this collector was created with.
    pub fn mode(&self) -> CollectorMode {
        self.mode
    }

    /// Applies a single event.
    pub fn push(&mut self, event: TestEvent) {
        let now = self.clock.now();

        if event.package.is_empty() {
            if event.action.is_build() {
                let run = self.ensure_run(event.time, now);
                let line = event.output.trim_end();
                if !line.is_empty() {
                    run.non_test_output.push(line.to_owned());
                }
            } else {
                debug!(action = %event.action, "ignoring event without a package");
            }
            return;
        }

        if event.test.is_empty() {
            self.push_package_event(event, now);
        } else {
            self.push_test_event(event, now);
        }
    }

    /// Finalizes the current run, if any.
    ///
    /// Packages that are still running are marked [`Status::Interrupted`], with an elapsed time
    /// estimated from the run's end time. Tests are left as they are.
    pub fn finish(&mut self) {
        let now = self.clock.now();
        let replay_rate = self.mode.replay_rate();
        let Some(run) = self.state.current_run_mut() else {
            return;
        };

        let end_time = compute_end_time(run, now, replay_rate);
        let total = duration_between(run.start_time, end_time);

        let mut interrupted = 0;
        for package in run.packages.values_mut() {
            if package.status != Status::Running {
                continue;
            }
            package.status = Status::Interrupted;
            package.elapsed = match replay_rate {
                Some(rate) if rate > 0.0 => {
                    // Measure from the run's own start so that every interrupted package agrees
                    // with the run total.
                    let offset = duration_between(run.start_time, package.start_time);
                    total.saturating_sub(offset)
                }
                _ => duration_between(package.start_time, end_time),
            };
            interrupted += 1;
        }

        run.running_pkgs = 0;
        run.end_time = Some(end_time);
        run.status = if interrupted > 0 {
            Status::Interrupted
        } else if run.has_failures() {
            Status::Failed
        } else if run.packages.is_empty() {
            Status::Unknown
        } else {
            Status::Passed
        };
        debug!(
            run = %run.id,
            interrupted,
            status = %run.status,
            "finished run",
        );

        self.state.clear_current();
    }

    fn push_package_event(&mut self, event: TestEvent, now: Timestamp) {
        let run = self.ensure_run(event.time, now);
        let package = ensure_package(run, &event.package, event.time, now);

        match event.action {
            Action::Output => {
                let line = event.output.trim_end();
                if !line.trim().is_empty() {
                    package.output = Some(line.to_owned());
                }
            }
            Action::Pass | Action::Fail | Action::Skip => {
                if package.status.is_terminal() {
                    debug!(
                        package = %package.name,
                        action = %event.action,
                        "ignoring terminal action for finished package",
                    );
                    return;
                }
                package.status = terminal_status(event.action);
                package.elapsed = event.elapsed_duration();
                run.running_pkgs = run.running_pkgs.saturating_sub(1);
                self.check_finished(now);
            }
            Action::Start
            | Action::Run
            | Action::Pause
            | Action::Resume
            | Action::Bench
            | Action::BuildOutput
            | Action::BuildFail
            | Action::BuildPass
            | Action::Unknown => {}
        }
    }

    fn push_test_event(&mut self, event: TestEvent, now: Timestamp) {
        let run = self.ensure_run(event.time, now);
        ensure_package(run, &event.package, event.time, now);

        let Run {
            packages,
            test_results,
            counts: run_counts,
            ..
        } = run;
        let package = packages
            .get_mut(&event.package)
            .expect("package was just ensured");

        let test = test_results
            .entry(TestKey::new(&event.package, &event.test))
            .or_insert_with(|| {
                package.test_order.push(event.test.clone());
                package.counts.running += 1;
                run_counts.running += 1;
                TestResult {
                    package: event.package.clone(),
                    name: event.test.clone(),
                    status: Status::Running,
                    start_time: event.time,
                    wall_start_time: now,
                    elapsed: Duration::ZERO,
                    output: Vec::new(),
                    summary_line: None,
                }
            });

        match event.action {
            Action::Run | Action::Resume => {
                if !test.status.is_terminal() {
                    test.status = Status::Running;
                }
            }
            Action::Pause => {
                if !test.status.is_terminal() {
                    test.status = Status::Paused;
                }
            }
            Action::Output => {
                let line = event.output.trim_end();
                let content = line.trim_start();
                if content.starts_with("===") || content.starts_with("---") {
                    test.summary_line = Some(content.to_owned());
                } else if !content.is_empty() {
                    test.output.push(line.to_owned());
                }
            }
            Action::Pass | Action::Fail | Action::Skip => {
                if test.status.is_terminal() {
                    return;
                }
                let status = terminal_status(event.action);
                test.status = status;
                test.elapsed = event.elapsed_duration();
                package.counts.record_finished(status);
                run_counts.record_finished(status);
            }
            Action::Start
            | Action::Bench
            | Action::BuildOutput
            | Action::BuildFail
            | Action::BuildPass
            | Action::Unknown => {}
        }
    }

    fn ensure_run(&mut self, event_time: Timestamp, now: Timestamp) -> &mut Run {
        if self.state.current_run().is_none() {
            self.state.start_run(event_time, now);
            debug!(run = self.state.runs().len(), "started run");
        }
        let run = self
            .state
            .current_run_mut()
            .expect("a current run was just ensured");
        if event_time > run.last_event_time {
            run.last_event_time = event_time;
        }
        run
    }

    fn check_finished(&mut self, now: Timestamp) {
        let replay_rate = self.mode.replay_rate();
        let Some(run) = self.state.current_run_mut() else {
            return;
        };
        if run.running_pkgs > 0 || run.packages.is_empty() {
            return;
        }

        run.end_time = Some(compute_end_time(run, now, replay_rate));
        run.status = if run.has_failures() {
            Status::Failed
        } else {
            Status::Passed
        };
        debug!(run = %run.id, status = %run.status, "run completed");
        self.state.clear_current();
    }
}

fn ensure_package<'a>(
    run: &'a mut Run,
    name: &str,
    event_time: Timestamp,
    now: Timestamp,
) -> &'a mut PackageResult {
    if !run.packages.contains_key(name) {
        run.running_pkgs += 1;
        run.packages.insert(
            name.to_owned(),
            PackageResult {
                name: name.to_owned(),
                status: Status::Running,
                start_time: event_time,
                wall_start_time: now,
                elapsed: Duration::ZERO,
                counts: Counts::default(),
                output: None,
                test_order: Vec::new(),
            },
        );
    }
    run.packages
        .get_mut(name)
        .expect("package was just inserted")
}

fn compute_end_time(run: &Run, now: Timestamp, replay_rate: Option<f64>) -> Timestamp {
    match replay_rate {
        Some(rate) if rate > 0.0 => {
            let wall = duration_between(run.wall_start_time, now);
            add_duration(run.start_time, rescale(wall, Some(rate)))
        }
        Some(_) => run.last_event_time,
        None => now,
    }
}

fn terminal_status(action: Action) -> Status {
    match action {
        Action::Pass => Status::Passed,
        Action::Fail => Status::Failed,
        Action::Skip => Status::Skipped,
        _ => Status::Unknown,
    }
}
