// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Displaying runs: the live view while a run is in progress, and the summary once it's over.
//!
//! The main types here are [`Renderer`], constructed via a [`RendererBuilder`], and
//! [`SummaryFormatter`].

mod displayer;
mod helpers;
mod summary;

pub use displayer::*;
pub use summary::*;
