// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use tracing::debug;

/// Returns true if frames should be redrawn in place on a stream that may be a terminal.
///
/// CI systems often present a terminal but keep every byte written to it, so live frames are
/// turned off there.
pub fn should_redraw(is_terminal: bool) -> bool {
    if is_terminal && is_ci::uncached() {
        debug!("running in CI, printing final frames only");
        return false;
    }
    is_terminal
}

/// The dimensions available to a frame, in columns and rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerminalSize {
    /// Columns.
    pub width: usize,
    /// Rows.
    pub height: usize,
}

impl TerminalSize {
    /// Used when the size can't be determined.
    pub const FALLBACK: Self = Self {
        width: 80,
        height: 24,
    };

    /// Queries the size of the terminal attached to this process.
    pub fn detect() -> Self {
        match crossterm::terminal::size() {
            Ok((width, height)) if width > 0 && height > 0 => Self {
                width: usize::from(width),
                height: usize::from(height),
            },
            _ => Self::FALLBACK,
        }
    }
}

/// Writes frames to an output stream.
///
/// On a terminal, each [`draw`](Self::draw) replaces the frame drawn before it. Elsewhere, drawn
/// frames are dropped and only [committed](Self::commit) text is written.
#[derive(Debug)]
pub struct FrameWriter<W> {
    out: W,
    is_terminal: bool,
    // Rows occupied by the frame currently on screen. The cursor sits on the last of them.
    drawn_rows: usize,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new frame writer.
    pub fn new(out: W, is_terminal: bool) -> Self {
        Self {
            out,
            is_terminal,
            drawn_rows: 0,
        }
    }

    /// Returns true if frames are redrawn in place.
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Replaces the frame on screen with `frame`, which should not end with a newline.
    pub fn draw(&mut self, frame: &str) -> io::Result<()> {
        if !self.is_terminal {
            return Ok(());
        }
        self.queue_clear()?;
        self.out.write_all(frame.as_bytes())?;
        self.drawn_rows = frame.lines().count().max(1);
        self.out.flush()
    }

    /// Replaces the frame on screen with `text`, which stays on screen. The next frame is drawn
    /// below it.
    pub fn commit(&mut self, text: &str) -> io::Result<()> {
        self.queue_clear()?;
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn queue_clear(&mut self) -> io::Result<()> {
        if self.drawn_rows == 0 {
            return Ok(());
        }
        queue!(self.out, MoveToColumn(0))?;
        let up = self.drawn_rows - 1;
        if up > 0 {
            queue!(self.out, MoveUp(u16::try_from(up).unwrap_or(u16::MAX)))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        self.drawn_rows = 0;
        Ok(())
    }
}
