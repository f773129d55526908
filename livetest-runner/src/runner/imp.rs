// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{EventSource, FrameWriter, TerminalSize};
use crate::{
    collector::{Collector, CollectorMode, Run, Status},
    errors::DriverError,
    exit_codes::LivetestExitCode,
    reporter::{Renderer, SummaryFormatter},
    signal::{SignalHandler, SignalHandlerKind},
    time::{Clock, SystemClock},
};
use debug_ignore::DebugIgnore;
use std::{io::Write, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Options for a [`LiveRunner`].
#[derive(Debug)]
pub struct LiveRunnerBuilder {
    /// Renders live frames.
    pub renderer: Renderer,

    /// Formats the report printed after each run.
    pub summary: SummaryFormatter,

    /// Live or replay.
    pub mode: CollectorMode,

    /// How often to redraw while waiting for events.
    pub tick_interval: Duration,

    /// Which signals end the run early.
    pub signal_handler: SignalHandlerKind,
}

impl LiveRunnerBuilder {
    /// Builds a runner that writes to `out`, reading wall-clock time from the system clock.
    pub fn build<W: Write>(self, out: W, is_terminal: bool) -> LiveRunner<W> {
        self.build_with_clock(out, is_terminal, SystemClock)
    }

    /// Builds a runner that reads wall-clock time from `clock`.
    pub fn build_with_clock<W: Write, C: Clock + Clone>(
        self,
        out: W,
        is_terminal: bool,
        clock: C,
    ) -> LiveRunner<W, C> {
        LiveRunner {
            collector: Collector::with_clock(self.mode, clock.clone()),
            clock,
            renderer: self.renderer,
            summary: self.summary,
            tick_interval: self.tick_interval,
            signal_handler: self.signal_handler,
            writer: FrameWriter::new(out, is_terminal),
            terminal_size: DebugIgnore(Box::new(TerminalSize::detect)),
            reported_runs: 0,
        }
    }
}

/// How a live session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// The number of runs observed.
    pub runs: usize,

    /// True if any run had a failing test or package.
    pub failed: bool,

    /// True if any run ended while packages were still running.
    pub interrupted: bool,

    /// True if a shutdown signal ended the session.
    pub signalled: bool,
}

impl RunOutcome {
    /// Returns the exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted || self.signalled {
            LivetestExitCode::INCOMPLETE_RUN
        } else if self.failed {
            LivetestExitCode::TEST_RUN_FAILED
        } else {
            LivetestExitCode::OK
        }
    }
}

/// Consumes events from an [`EventSource`] and keeps a live view of the current run on screen.
///
/// Every run that ends, whether because all of its packages finished or because the input
/// stopped, is printed one final time followed by its summary.
#[derive(Debug)]
pub struct LiveRunner<W, C = SystemClock> {
    collector: Collector<C>,
    clock: C,
    renderer: Renderer,
    summary: SummaryFormatter,
    tick_interval: Duration,
    signal_handler: SignalHandlerKind,
    writer: FrameWriter<W>,
    terminal_size: DebugIgnore<Box<dyn Fn() -> TerminalSize + Send>>,
    reported_runs: usize,
}

impl<W: Write, C: Clock> LiveRunner<W, C> {
    /// Replaces how the terminal size is determined.
    pub fn with_terminal_size(
        mut self,
        terminal_size: impl Fn() -> TerminalSize + Send + 'static,
    ) -> Self {
        self.terminal_size = DebugIgnore(Box::new(terminal_size));
        self
    }

    /// Drives the session until the input ends or a shutdown signal arrives.
    pub async fn run(&mut self, mut source: EventSource) -> Result<RunOutcome, DriverError> {
        let mut signal_handler: SignalHandler = self.signal_handler.build()?;
        let mut signals_done = false;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let signalled = loop {
            tokio::select! {
                event = source.recv() => {
                    let Some(event) = event else {
                        break false;
                    };
                    self.collector.push(event);
                    // Apply everything that's already queued before redrawing.
                    while let Some(event) = source.try_recv() {
                        self.collector.push(event);
                    }
                    self.report_finished_runs()?;
                    self.draw_current()?;
                }
                _ = ticker.tick() => {
                    self.draw_current()?;
                }
                signal = signal_handler.recv(), if !signals_done => {
                    match signal {
                        Some(signal) => {
                            debug!(?signal, "shutdown signal received, finishing run");
                            source.close();
                            break true;
                        }
                        None => signals_done = true,
                    }
                }
            }
        };

        self.collector.finish();
        self.report_finished_runs()?;

        // Reading errors surface after the partial run has been reported.
        let stats = source.join().await?;
        debug!(
            events = stats.events,
            raw_lines = stats.raw_lines,
            signalled,
            "live session done",
        );

        Ok(self.outcome(signalled))
    }

    /// Consumes the runner, returning the output stream.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn draw_current(&mut self) -> Result<(), DriverError> {
        if !self.writer.is_terminal() {
            return Ok(());
        }
        let Some(run) = self.collector.state().current_run() else {
            return Ok(());
        };
        let size = (*self.terminal_size)();
        let frame = self.renderer.render(
            run,
            size.width,
            size.height,
            self.collector.mode().replay_rate(),
            self.clock.now(),
        );
        self.writer
            .draw(&frame)
            .map_err(|error| DriverError::Write { error })
    }

    fn report_finished_runs(&mut self) -> Result<(), DriverError> {
        let runs = self.collector.state().runs();
        while self.reported_runs < runs.len() {
            let run = &runs[self.reported_runs];
            if run.end_time.is_none() {
                break;
            }

            // Final frames are printed in full.
            let width = (*self.terminal_size)().width;
            let frame = self.renderer.render(
                run,
                width,
                usize::MAX,
                self.collector.mode().replay_rate(),
                self.clock.now(),
            );
            let summary = self.summary.format(run);
            debug!(run = %run.id, status = %run.status, "reporting finished run");

            self.writer
                .commit(&format!("{frame}\n\n{summary}"))
                .map_err(|error| DriverError::Write { error })?;
            self.reported_runs += 1;
        }
        Ok(())
    }

    fn outcome(&self, signalled: bool) -> RunOutcome {
        let runs = self.collector.state().runs();
        RunOutcome {
            runs: runs.len(),
            failed: runs.iter().any(Run::has_failures),
            interrupted: runs.iter().any(|run| run.status == Status::Interrupted),
            signalled,
        }
    }
}
