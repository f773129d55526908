// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser};
use livetest_runner::{
    collector::CollectorMode,
    reporter::{RendererBuilder, SummaryFormatter},
    runner::{EventSourceBuilder, InputSpec, LiveRunnerBuilder, should_redraw},
    signal::SignalHandlerKind,
    user_config::{UiConfig, UserConfig, UserConfigLocation},
};
use std::{
    io::{BufWriter, IsTerminal},
    time::Duration,
};
use tracing::{debug, info};

/// A live, space-constrained view of `go test -json` output.
///
/// Pipe the output of `go test -json ./...` into livetest, or pass a file recorded earlier.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100,
)]
pub struct LivetestApp {
    /// Read events from this file instead of standard input
    #[arg(value_name = "INPUT")]
    input: Option<Utf8PathBuf>,

    #[clap(flatten)]
    replay: ReplayOpts,

    #[clap(flatten)]
    ui: UiOpts,

    /// Write lines that are not test events to this file
    #[arg(long, value_name = "PATH")]
    raw_output: Option<Utf8PathBuf>,

    /// User config file [default: ~/.config/livetest/config.toml or platform equivalent]
    ///
    /// Pass `none` to ignore any user config file.
    #[arg(long, value_name = "PATH", env = "LIVETEST_USER_CONFIG_FILE")]
    user_config_file: Option<String>,

    #[clap(flatten)]
    output: OutputOpts,
}

impl LivetestApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the exit code.
    pub fn exec(self, output: OutputContext) -> Result<i32> {
        let mode = self.replay.collector_mode()?;

        let location = UserConfigLocation::from_cli_or_env(self.user_config_file.as_deref());
        let user_config = UserConfig::load(location)?;
        let ui = self.ui.apply(user_config.ui);
        debug!(?mode, ?ui, "resolved settings");

        let input = match self.input {
            Some(path) => InputSpec::File(path),
            None => {
                if std::io::stdin().is_terminal() {
                    info!("reading test events from standard input (pipe `go test -json` in)");
                }
                InputSpec::Stdin
            }
        };

        let renderer = RendererBuilder {
            should_colorize: output.stdout_colorized(),
            use_unicode: output.stdout_unicode(),
            max_output_lines: ui.max_output_lines,
            interrupted_icon: ui.interrupted_icon,
        }
        .build();
        let summary = SummaryFormatter::new(
            output.stdout_colorized(),
            output.stdout_unicode(),
            ui.slow_threshold,
        );

        let source_builder = EventSourceBuilder {
            raw_output: self.raw_output,
            replay_rate: mode.replay_rate(),
            channel_capacity: ui.channel_capacity,
        };
        let runner_builder = LiveRunnerBuilder {
            renderer,
            summary,
            mode,
            tick_interval: ui.tick_interval,
            signal_handler: SignalHandlerKind::Standard,
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("livetest-worker")
            .build()
            .map_err(|err| ExpectedError::RuntimeCreate { err })?;

        let stdout = std::io::stdout();
        let redraw = should_redraw(stdout.is_terminal());
        let result = runtime.block_on(async move {
            let source = source_builder.spawn(input).await?;
            let mut runner = runner_builder.build(BufWriter::new(stdout.lock()), redraw);
            runner.run(source).await
        });

        // A read from standard input may still be blocked; don't wait for it.
        runtime.shutdown_background();

        let outcome = result?;
        debug!(?outcome, "live run complete");
        Ok(outcome.exit_code())
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Replay options")]
struct ReplayOpts {
    /// Reproduce the original timing between events
    #[arg(long)]
    replay: bool,

    /// Multiplier for the delay between replayed events (0 = no delay, 0.5 = twice as fast)
    #[arg(long, value_name = "RATE", default_value_t = 1.0, requires = "replay")]
    replay_rate: f64,
}

impl ReplayOpts {
    fn collector_mode(&self) -> Result<CollectorMode> {
        if !self.replay {
            return Ok(CollectorMode::Live);
        }
        if !self.replay_rate.is_finite() || self.replay_rate < 0.0 {
            return Err(ExpectedError::InvalidReplayRate {
                rate: self.replay_rate,
            });
        }
        Ok(CollectorMode::Replay {
            rate: self.replay_rate,
        })
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Display options")]
struct UiOpts {
    /// List tests at least this slow in the summary [default: 500ms]
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    slow_threshold: Option<Duration>,

    /// Output lines shown under each running test [default: 6]
    #[arg(long, value_name = "N")]
    max_output_lines: Option<usize>,
}

impl UiOpts {
    /// Applies command-line overrides on top of the configured settings.
    fn apply(&self, mut ui: UiConfig) -> UiConfig {
        if let Some(slow_threshold) = self.slow_threshold {
            ui.slow_threshold = slow_threshold;
        }
        if let Some(max_output_lines) = self.max_output_lines {
            ui.max_output_lines = max_output_lines;
        }
        ui
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> std::result::Result<LivetestApp, clap::Error> {
        LivetestApp::try_parse_from(std::iter::once("livetest").chain(args.iter().copied()))
    }

    #[test]
    fn verify_app() {
        LivetestApp::command().debug_assert();
    }

    #[test]
    fn replay_modes() {
        let app = parse(&[]).expect("no arguments is valid");
        assert_eq!(
            app.replay.collector_mode().expect("valid"),
            CollectorMode::Live
        );

        let app = parse(&["--replay", "run.json"]).expect("replay is valid");
        assert_eq!(app.input.as_deref(), Some(Utf8Path::new("run.json")));
        assert_eq!(
            app.replay.collector_mode().expect("valid"),
            CollectorMode::Replay { rate: 1.0 }
        );

        let app = parse(&["--replay", "--replay-rate", "0"]).expect("zero rate is valid");
        assert_eq!(
            app.replay.collector_mode().expect("valid"),
            CollectorMode::Replay { rate: 0.0 }
        );

        let app = parse(&["--replay", "--replay-rate=-2"]).expect("parses");
        assert!(matches!(
            app.replay.collector_mode(),
            Err(ExpectedError::InvalidReplayRate { .. })
        ));

        parse(&["--replay-rate", "2"]).expect_err("rate requires --replay");
    }

    #[test]
    fn ui_overrides() {
        let app = parse(&["--slow-threshold", "2s", "--max-output-lines", "3"])
            .expect("valid arguments");
        let defaults = UserConfig::load(UserConfigLocation::Isolated)
            .expect("defaults load")
            .ui;
        let ui = app.ui.apply(defaults.clone());
        assert_eq!(ui.slow_threshold, Duration::from_secs(2));
        assert_eq!(ui.max_output_lines, 3);
        assert_eq!(ui.tick_interval, defaults.tick_interval);

        parse(&["--slow-threshold", "soon"]).expect_err("invalid duration");
    }
}
