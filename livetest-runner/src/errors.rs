// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by livetest.
//!
//! The reducer and renderer have no failure modes of their own; everything here concerns the
//! edges of the system: configuration, reading input and writing output.

use camino::{FromPathBufError, Utf8PathBuf};
use std::{error::Error, fmt, io};
use thiserror::Error;

/// An error that occurred while reading or parsing the user config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserConfigError {
    /// The user config file explicitly specified was not found.
    #[error("user config file not found at {path}")]
    FileNotFound {
        /// The path that was passed in.
        path: Utf8PathBuf,
    },

    /// An error occurred while reading the user config file.
    #[error("failed to read user config at {path}")]
    Read {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// An error occurred while parsing the user config file.
    #[error("failed to parse user config at {path}")]
    Parse {
        /// The path to the config file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: toml::de::Error,
    },

    /// The user config directory is not valid UTF-8.
    #[error("user config path contains non-UTF-8 characters")]
    NonUtf8Path {
        /// The error that occurred.
        #[source]
        error: FromPathBufError,
    },
}

/// An error that occurred while driving a live run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    /// The input file could not be opened.
    #[error("failed to open input file `{path}`")]
    InputOpen {
        /// The path to the input file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// Reading from the input stream failed.
    #[error("failed to read from {source_name}")]
    InputRead {
        /// A human-readable name for the input, e.g. `standard input`.
        source_name: String,

        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// The raw output file could not be created.
    #[error("failed to create raw output file `{path}`")]
    RawOutputCreate {
        /// The path to the raw output file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// Writing a raw (non-event) line failed.
    #[error("failed to write to raw output file `{path}`")]
    RawOutputWrite {
        /// The path to the raw output file.
        path: Utf8PathBuf,

        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// Writing a frame or the summary to the terminal failed.
    #[error("failed to write output")]
    Write {
        /// The error that occurred.
        #[source]
        error: io::Error,
    },

    /// The Ctrl-C handler could not be installed.
    #[error("failed to set up interrupt handler")]
    SignalSetup {
        /// The error that occurred.
        #[source]
        error: io::Error,
    },
}

/// Displays an error along with the chain of errors that caused it.
///
/// The error itself is displayed first, then each source is displayed on its own indented line,
/// prefixed with `caused by:`.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E> fmt::Display for DisplayErrorChain<E>
where
    E: Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        while let Some(err) = source {
            write!(f, "\n  caused by:\n  - {err}")?;
            source = err.source();
        }

        Ok(())
    }
}
