// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::collector::Status;
use owo_colors::Style;

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) is_colorized: bool,
    pub(super) count: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) skip: Style,
    pub(super) interrupted: Style,
    pub(super) running: Style,
    pub(super) heading: Style,
    pub(super) dim: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.is_colorized = true;
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
        self.interrupted = Style::new().magenta().bold();
        self.running = Style::new().cyan().bold();
        self.heading = Style::new().bold().underline();
        self.dim = Style::new().dimmed();
    }

    /// Returns the style used for an entity with this status.
    pub(super) fn for_status(&self, status: Status) -> Style {
        match status {
            Status::Passed => self.pass,
            Status::Failed => self.fail,
            Status::Skipped => self.skip,
            Status::Interrupted => self.interrupted,
            Status::Running => self.running,
            Status::Paused | Status::Unknown => self.dim,
        }
    }
}
