// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-specific configuration for livetest.
//!
//! ## Config file location
//!
//! The user config file is searched for in the following locations:
//!
//! - **Unix/macOS**: `$XDG_CONFIG_HOME/livetest/config.toml` or
//!   `~/.config/livetest/config.toml`
//! - **Windows**: `%APPDATA%\livetest\config.toml`, with fallback to
//!   `~/.config/livetest/config.toml`
//!
//! ## Configuration hierarchy
//!
//! Settings are resolved in the following order (highest priority first):
//!
//! 1. CLI arguments (e.g. `--slow-threshold 1s`)
//! 2. User config (`[ui]` section)
//! 3. Built-in defaults

mod discovery;
mod elements;
mod imp;

pub use discovery::*;
pub use elements::UiConfig;
pub use imp::*;
