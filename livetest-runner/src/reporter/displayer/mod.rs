// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The live, space-constrained view of a run.

pub(crate) mod formatters;
mod imp;
mod layout;

pub use imp::*;
