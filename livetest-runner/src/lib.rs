// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for livetest.
//!
//! The flow through this crate is:
//!
//! 1. An [`EventSource`](runner::EventSource) reads `go test -json` lines and decodes them into
//!    [`TestEvent`](event::TestEvent)s.
//! 2. A [`Collector`](collector::Collector) reduces those events into a [`State`](collector::State)
//!    made up of runs, packages and tests, inferring run boundaries from package lifecycles.
//! 3. A [`Renderer`](reporter::Renderer) turns the current [`Run`](collector::Run) into a frame
//!    that fits the terminal.
//! 4. Once a run is over, a [`SummaryFormatter`](reporter::SummaryFormatter) produces the final
//!    report.
//!
//! The [`LiveRunner`](runner::LiveRunner) ties these together on a tokio runtime.

pub mod collector;
pub mod errors;
pub mod event;
pub mod exit_codes;
mod helpers;
pub mod reporter;
pub mod runner;
pub mod signal;
pub mod time;
pub mod user_config;
