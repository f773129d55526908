// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders the live view of a run.
//!
//! The main structure in this module is [`Renderer`], which is constructed via a
//! [`RendererBuilder`].

use super::{
    formatters::{
        ColumnWidths, DisplayCountsAndElapsed, DisplayElapsed, align_line, display_elapsed,
        fit_line,
    },
    layout::{Candidate, allocate, sort_candidates},
};
use crate::{
    collector::{PackageResult, Run, Status, TestResult},
    helpers::{ThemeCharacters, expand_tabs},
    reporter::helpers::Styles,
    time::{Timestamp, duration_between, rescale},
};
use owo_colors::OwoColorize;
use serde::Deserialize;
use std::{collections::HashMap, fmt, time::Duration};

/// The default number of output lines shown under each running test.
pub const DEFAULT_MAX_OUTPUT_LINES: usize = 6;

/// How often the spinner advances.
const SPINNER_INTERVAL_MILLIS: i64 = 100;

/// The icon shown for a package that was interrupted before it finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterruptedIcon {
    /// Guess from what the package did before it was interrupted: the fail icon if any test
    /// failed, the skip icon if no tests were seen, and the pass icon otherwise.
    #[default]
    Heuristic,

    /// Always use a dedicated interrupted icon.
    Fixed,
}

impl fmt::Display for InterruptedIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => f.write_str("heuristic"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// Builds a [`Renderer`].
#[derive(Clone, Debug)]
pub struct RendererBuilder {
    /// Whether to emit ANSI color codes.
    pub should_colorize: bool,

    /// Whether to use Unicode icons and spinners.
    pub use_unicode: bool,

    /// The maximum number of output lines shown under each running test.
    pub max_output_lines: usize,

    /// The icon policy for interrupted packages.
    pub interrupted_icon: InterruptedIcon,
}

impl Default for RendererBuilder {
    fn default() -> Self {
        Self {
            should_colorize: false,
            use_unicode: false,
            max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
            interrupted_icon: InterruptedIcon::default(),
        }
    }
}

impl RendererBuilder {
    /// Creates the renderer.
    pub fn build(self) -> Renderer {
        let mut styles: Box<Styles> = Box::default();
        if self.should_colorize {
            styles.colorize();
        }
        let mut theme_characters = ThemeCharacters::default();
        if self.use_unicode {
            theme_characters.use_unicode();
        }

        Renderer {
            styles,
            theme_characters,
            max_output_lines: self.max_output_lines,
            interrupted_icon: self.interrupted_icon,
        }
    }
}

/// Turns a [`Run`] into a frame that fits in a terminal.
///
/// Rendering is a pure function of its inputs: the same run, dimensions and time always produce
/// the same frame.
#[derive(Clone, Debug)]
pub struct Renderer {
    styles: Box<Styles>,
    theme_characters: ThemeCharacters,
    max_output_lines: usize,
    interrupted_icon: InterruptedIcon,
}

impl Renderer {
    /// Renders `run` into at most `height` lines of `width` columns.
    ///
    /// `now` is the current wall-clock time, used for the elapsed times of entities that haven't
    /// finished and for the spinner. In replay mode, `replay_rate` converts those times back to
    /// original time.
    ///
    /// The returned frame has no trailing newline.
    pub fn render(
        &self,
        run: &Run,
        width: usize,
        height: usize,
        replay_rate: Option<f64>,
        now: Timestamp,
    ) -> String {
        let ctx = RenderContext {
            width,
            replay_rate,
            now,
            spinner_tick: (now.timestamp_millis() / SPINNER_INTERVAL_MILLIS).unsigned_abs(),
        };

        let mut lines = Vec::new();
        for line in &run.non_test_output {
            lines.push(fit_line(&expand_tabs(line), width));
        }
        if !run.non_test_output.is_empty() {
            lines.push(String::new());
        }

        // Compute column widths across every package and the run totals, so the right-hand
        // columns line up.
        let run_elapsed = self.run_elapsed(run, &ctx);
        let mut widths = ColumnWidths::default();
        widths.fit(&run.counts, run_elapsed);
        for package in run.packages.values() {
            widths.fit(&package.counts, self.package_elapsed(package, &ctx));
        }

        let fixed_cost = lines.len() + 1 + run.packages.len() + usize::from(!run.packages.is_empty());
        let available = height.saturating_sub(fixed_cost);
        let grants = self.allocate_tests(run, available);

        for package in run.packages.values() {
            lines.push(self.package_line(package, widths, &ctx));
            if !is_expandable(package) {
                continue;
            }
            for test in run.tests_in(package) {
                let grant = grants.get(&(package.name.as_str(), test.name.as_str()));
                if let Some(&grant) = grant.filter(|grant| **grant > 0) {
                    self.push_test_lines(&mut lines, test, grant, widths, &ctx);
                }
            }
        }

        if !run.packages.is_empty() {
            lines.push(
                self.theme_characters
                    .hbar(width)
                    .style(self.styles.dim)
                    .to_string(),
            );
        }
        lines.push(self.summary_line(run, run_elapsed, widths, &ctx));

        // If even the fixed lines don't fit, drop the oldest ones so the summary survives.
        let excess = lines.len().saturating_sub(height);
        lines.drain(..excess);

        lines.join("\n")
    }

    fn allocate_tests<'a>(
        &self,
        run: &'a Run,
        available: usize,
    ) -> HashMap<(&'a str, &'a str), usize> {
        let mut candidates: Vec<Candidate<'a>> = run
            .packages
            .values()
            .filter(|package| is_expandable(package))
            .flat_map(|package| run.tests_in(package))
            .map(|test| Candidate::new(test, self.max_output_lines))
            .collect();
        sort_candidates(&mut candidates);

        let grants = allocate(candidates.iter().map(|candidate| candidate.lines), available);
        candidates
            .iter()
            .zip(grants)
            .map(|(candidate, grant)| {
                (
                    (candidate.test.package.as_str(), candidate.test.name.as_str()),
                    grant,
                )
            })
            .collect()
    }

    fn package_line(
        &self,
        package: &PackageResult,
        widths: ColumnWidths,
        ctx: &RenderContext,
    ) -> String {
        let prefix = format!("{} ", self.package_icon(package, ctx));
        let label = if is_expandable(package) {
            package.name.as_str()
        } else {
            package.output.as_deref().unwrap_or(&package.name)
        };
        let right = DisplayCountsAndElapsed {
            counts: &package.counts,
            elapsed: self.package_elapsed(package, ctx),
            widths,
            styles: &self.styles,
        }
        .to_string();
        align_line(&prefix, &expand_tabs(label), &right, ctx.width)
    }

    fn push_test_lines(
        &self,
        lines: &mut Vec<String>,
        test: &TestResult,
        grant: usize,
        widths: ColumnWidths,
        ctx: &RenderContext,
    ) {
        let prefix = format!("  {} ", self.test_icon(test.status, ctx));
        let header = match &test.summary_line {
            Some(summary_line) => summary_line.clone(),
            None => format!("=== RUN   {}", test.name),
        };
        let elapsed = display_elapsed(
            test.status,
            test.elapsed,
            test.wall_start_time,
            ctx.now,
            ctx.replay_rate,
        );
        let right = format!("{:>width$}", DisplayElapsed(elapsed), width = widths.elapsed);
        lines.push(align_line(&prefix, &expand_tabs(&header), &right, ctx.width));

        if test.status != Status::Running {
            return;
        }
        let body_lines = (grant - 1).min(self.max_output_lines).min(test.output.len());
        for line in &test.output[test.output.len() - body_lines..] {
            let line = format!("    {}", expand_tabs(line));
            lines.push(fit_line(&line, ctx.width));
        }
    }

    fn summary_line(
        &self,
        run: &Run,
        run_elapsed: Duration,
        widths: ColumnWidths,
        ctx: &RenderContext,
    ) -> String {
        let word = run.status.summary_word();
        let left = format!("{}", word.style(self.styles.for_status(run.status)));
        let right = DisplayCountsAndElapsed {
            counts: &run.counts,
            elapsed: run_elapsed,
            widths,
            styles: &self.styles,
        }
        .to_string();
        align_line("", &left, &right, ctx.width)
    }

    fn package_icon(&self, package: &PackageResult, ctx: &RenderContext) -> String {
        let theme = &self.theme_characters;
        match package.status {
            Status::Interrupted => match self.interrupted_icon {
                InterruptedIcon::Fixed => theme
                    .interrupted_icon()
                    .style(self.styles.interrupted)
                    .to_string(),
                InterruptedIcon::Heuristic => {
                    if package.counts.failed > 0 {
                        self.status_icon(Status::Failed, ctx)
                    } else if package.test_order.is_empty() {
                        self.status_icon(Status::Skipped, ctx)
                    } else {
                        self.status_icon(Status::Passed, ctx)
                    }
                }
            },
            status => self.status_icon(status, ctx),
        }
    }

    fn test_icon(&self, status: Status, ctx: &RenderContext) -> String {
        match status {
            Status::Interrupted => self
                .theme_characters
                .interrupted_icon()
                .style(self.styles.interrupted)
                .to_string(),
            status => self.status_icon(status, ctx),
        }
    }

    fn status_icon(&self, status: Status, ctx: &RenderContext) -> String {
        let theme = &self.theme_characters;
        let icon = match status {
            Status::Passed => theme.pass_icon(),
            Status::Failed => theme.fail_icon(),
            Status::Skipped => theme.skip_icon(),
            Status::Interrupted => theme.interrupted_icon(),
            Status::Running | Status::Paused => theme.spinner_frame(ctx.spinner_tick),
            Status::Unknown => " ",
        };
        icon.style(self.styles.for_status(status)).to_string()
    }

    fn package_elapsed(&self, package: &PackageResult, ctx: &RenderContext) -> Duration {
        display_elapsed(
            package.status,
            package.elapsed,
            package.wall_start_time,
            ctx.now,
            ctx.replay_rate,
        )
    }

    fn run_elapsed(&self, run: &Run, ctx: &RenderContext) -> Duration {
        match run.duration() {
            Some(duration) => duration,
            None => rescale(
                duration_between(run.wall_start_time, ctx.now),
                ctx.replay_rate,
            ),
        }
    }
}

struct RenderContext {
    width: usize,
    replay_rate: Option<f64>,
    now: Timestamp,
    spinner_tick: u64,
}

/// Only packages that haven't finished normally show their tests.
fn is_expandable(package: &PackageResult) -> bool {
    matches!(package.status, Status::Running | Status::Interrupted)
}
