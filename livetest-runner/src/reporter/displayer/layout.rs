// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deciding which tests get screen space.
//!
//! Every test in an expandable package asks for some number of lines. Requests are ordered by
//! [`Priority`] and then by recency, and granted greedily until the line budget runs out.

use crate::{
    collector::{Status, TestResult},
    time::Timestamp,
};
use std::cmp::Reverse;

/// How urgently a test should be shown. Lower values are shown first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Priority {
    /// Running or paused tests.
    Active = 1,
    /// Failed tests.
    Failed = 2,
    /// Everything else.
    Rest = 3,
}

impl Priority {
    pub(crate) fn of(status: Status) -> Self {
        match status {
            Status::Running | Status::Paused => Self::Active,
            Status::Failed => Self::Failed,
            Status::Unknown | Status::Passed | Status::Skipped | Status::Interrupted => Self::Rest,
        }
    }
}

/// A test asking for lines in the live view.
#[derive(Clone, Debug)]
pub(crate) struct Candidate<'a> {
    pub(crate) test: &'a TestResult,
    pub(crate) priority: Priority,
    pub(crate) start_time: Timestamp,
    /// Lines requested: one for the header plus any output lines.
    pub(crate) lines: usize,
}

impl<'a> Candidate<'a> {
    /// Builds a candidate for `test`, showing at most `max_output_lines` lines of output.
    pub(crate) fn new(test: &'a TestResult, max_output_lines: usize) -> Self {
        let output_lines = if test.status == Status::Running {
            test.output.len().min(max_output_lines)
        } else {
            0
        };
        Self {
            test,
            priority: Priority::of(test.status),
            start_time: test.start_time,
            lines: 1 + output_lines,
        }
    }
}

/// Sorts candidates into allocation order: by priority, then newest first.
///
/// The sort is stable, so candidates that tie keep the order they were given in.
pub(crate) fn sort_candidates(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by_key(|candidate| (candidate.priority, Reverse(candidate.start_time)));
}

/// Grants lines to each request in order.
///
/// A request is granted in full if it fits in what's left of the budget. Otherwise it gets
/// whatever remains (which always covers its header first), and everything after it gets nothing.
pub(crate) fn allocate(requests: impl IntoIterator<Item = usize>, budget: usize) -> Vec<usize> {
    let mut remaining = budget;
    requests
        .into_iter()
        .map(|request| {
            let grant = request.min(remaining);
            remaining -= grant;
            grant
        })
        .collect()
}
