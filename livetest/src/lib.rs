// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A live, space-constrained terminal view for `go test -json` streams.
//!
//! The library portion of this crate is an implementation detail of the `livetest` binary. The
//! reusable pieces live in `livetest-runner`.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputContext;
