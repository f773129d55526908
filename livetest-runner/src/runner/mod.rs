// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driving a live view from an input stream.
//!
//! The main structure in this module is [`LiveRunner`]. It consumes events from an
//! [`EventSource`], which reads and decodes input on its own task, and draws frames through a
//! [`FrameWriter`].

mod frame;
mod imp;
mod source;

pub use frame::*;
pub use imp::*;
pub use source::*;
