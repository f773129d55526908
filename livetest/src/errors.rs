// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::StderrStyles;
use livetest_runner::{
    errors::{DisplayErrorChain, DriverError, UserConfigError},
    exit_codes::LivetestExitCode,
};
use owo_colors::OwoColorize;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure, reported to the user with a documented exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("user config error")]
    UserConfigError {
        #[from]
        err: UserConfigError,
    },
    #[error("invalid replay rate")]
    InvalidReplayRate { rate: f64 },
    #[error("failed to create tokio runtime")]
    RuntimeCreate {
        #[source]
        err: std::io::Error,
    },
    #[error("live run failed")]
    DriverError {
        #[from]
        err: DriverError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::UserConfigError { .. }
            | Self::InvalidReplayRate { .. }
            | Self::RuntimeCreate { .. } => LivetestExitCode::SETUP_ERROR,
            Self::DriverError { err } => match err {
                DriverError::InputOpen { .. } | DriverError::InputRead { .. } => {
                    LivetestExitCode::INPUT_READ_ERROR
                }
                DriverError::RawOutputCreate { .. }
                | DriverError::RawOutputWrite { .. }
                | DriverError::Write { .. } => LivetestExitCode::WRITE_OUTPUT_ERROR,
                _ => LivetestExitCode::SETUP_ERROR,
            },
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        error!("{}", self.message(styles));
    }

    fn message(&self, styles: &StderrStyles) -> String {
        match self {
            Self::UserConfigError { err } => DisplayErrorChain::new(err).to_string(),
            Self::InvalidReplayRate { rate } => format!(
                "invalid replay rate {}: must be a finite number, zero or greater",
                rate.style(styles.bold)
            ),
            Self::RuntimeCreate { .. } => DisplayErrorChain::new(self).to_string(),
            Self::DriverError { err } => DisplayErrorChain::new(err).to_string(),
        }
    }
}
