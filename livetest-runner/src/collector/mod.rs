// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconstructing runs, packages and tests from a flat event stream.
//!
//! `go test -json` has no notion of a "run": it is a flat, interleaved stream of events for
//! packages executing concurrently. The [`Collector`] groups these events into [`Run`]s by
//! watching package lifecycles. A run starts with the first event after the previous run ended,
//! and ends as soon as the last of its packages reports a terminal action.

mod imp;
mod model;

pub use imp::*;
pub use model::*;
