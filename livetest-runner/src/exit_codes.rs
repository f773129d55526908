// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exit codes.

/// Documented exit codes for `livetest` failures.
///
/// `livetest` may fail for a variety of reasons. This structure documents the exit codes that may
/// occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum LivetestExitCode {}

impl LivetestExitCode {
    /// No errors occurred, and every observed run passed.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up a livetest invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// One or more tests or packages failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The input ended (or the user interrupted livetest) while packages were still running.
    pub const INCOMPLETE_RUN: i32 = 106;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// Reading the event stream produced an error.
    pub const INPUT_READ_ERROR: i32 = 111;
}
