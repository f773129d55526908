// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! These drive recorded `go test -json` streams from `tests/fixtures` through the decoder,
//! collector, renderer and summary formatter, the same way the `livetest` binary does.

mod fixtures;
mod live_view;
mod replay;
mod runs;
mod summary;
