// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General support code for livetest-runner.

use console::AnsiCodeIterator;
use std::borrow::Cow;
use unicode_width::UnicodeWidthChar;

/// The ANSI sequence that resets all styling.
pub(crate) const ANSI_RESET: &str = "\x1b[0m";

/// Tab stops are placed every this many columns.
const TAB_WIDTH: usize = 8;

/// Utilities for pluralizing various words based on count.
pub mod plural {
    /// Returns "test" if `count` is 1, otherwise "tests".
    pub fn tests_str(count: usize) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }

    /// Returns "package" if `count` is 1, otherwise "packages".
    pub fn packages_str(count: usize) -> &'static str {
        if count == 1 { "package" } else { "packages" }
    }
}

pub(crate) fn usize_decimal_char_width(n: usize) -> usize {
    // checked_ilog10 returns 0 for 1-9, 1 for 10-99, 2 for 100-999, etc. (And
    // None for 0 which we unwrap to the same as 1). Add 1 to it to get the
    // actual number of digits.
    n.checked_ilog10().unwrap_or(0) as usize + 1
}

/// Returns the display width of `text`, ignoring ANSI escape codes.
pub(crate) fn text_width(text: &str) -> usize {
    // The width of a string isn't always the sum of the widths of its characters, but truncation
    // is much easier to manage if we pretend it is (both here and in truncate_ansi_aware).
    strip_ansi_escapes::strip_str(text)
        .chars()
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Keeps the characters of `text` that fall within display columns `start..end`.
///
/// ANSI escape codes are always retained, so styles opened before the cut are still closed.
pub(crate) fn truncate_ansi_aware(text: &str, start: usize, end: usize) -> String {
    let mut pos = 0;
    let mut res = String::new();
    for (s, is_ansi) in AnsiCodeIterator::new(text) {
        if is_ansi {
            res.push_str(s);
            continue;
        } else if pos >= end {
            // Escape codes are retained, so keep going rather than breaking.
            continue;
        }

        for c in s.chars() {
            let c_width = c.width().unwrap_or(0);
            if start <= pos && pos + c_width <= end {
                res.push(c);
            }
            pos += c_width;
            if pos > end {
                break;
            }
        }
    }

    res
}

/// Replaces tabs with spaces up to the next tab stop.
///
/// Columns are counted in display width, and escape codes don't advance the column.
pub(crate) fn expand_tabs(text: &str) -> Cow<'_, str> {
    if !text.contains('\t') {
        return Cow::Borrowed(text);
    }

    let mut column = 0;
    let mut res = String::with_capacity(text.len() + TAB_WIDTH);
    for (s, is_ansi) in AnsiCodeIterator::new(text) {
        if is_ansi {
            res.push_str(s);
            continue;
        }
        for c in s.chars() {
            if c == '\t' {
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                res.extend(std::iter::repeat_n(' ', spaces));
                column += spaces;
            } else {
                res.push(c);
                column += c.width().unwrap_or(0);
            }
        }
    }

    Cow::Owned(res)
}

/// Appends a reset to `line` if it contains an escape sequence and doesn't already end with one.
///
/// This stops styles from bleeding into the lines that follow.
pub(crate) fn ensure_reset(mut line: String) -> String {
    if line.contains('\x1b') && !line.ends_with(ANSI_RESET) {
        line.push_str(ANSI_RESET);
    }
    line
}

/// Characters used for terminal output theming.
///
/// Provides both ASCII and Unicode variants for horizontal bars, status icons and spinners.
#[derive(Clone, Debug)]
pub struct ThemeCharacters {
    hbar: char,
    spinner: &'static [&'static str],
    pass: &'static str,
    fail: &'static str,
    skip: &'static str,
    interrupted: &'static str,
}

impl Default for ThemeCharacters {
    fn default() -> Self {
        Self {
            hbar: '-',
            spinner: &["-", "\\", "|", "/"],
            pass: "+",
            fail: "x",
            skip: "~",
            interrupted: "!",
        }
    }
}

impl ThemeCharacters {
    /// Switches to Unicode characters for richer terminal output.
    pub fn use_unicode(&mut self) {
        self.hbar = '─';
        self.spinner = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        self.pass = "✓";
        self.fail = "✗";
        self.skip = "↷";
        self.interrupted = "‼";
    }

    /// Returns a horizontal bar of the specified width.
    pub fn hbar(&self, width: usize) -> String {
        std::iter::repeat_n(self.hbar, width).collect()
    }

    /// Returns the spinner frame for `tick`.
    pub fn spinner_frame(&self, tick: u64) -> &'static str {
        self.spinner[(tick % self.spinner.len() as u64) as usize]
    }

    /// Returns the icon for a passed entity.
    pub fn pass_icon(&self) -> &'static str {
        self.pass
    }

    /// Returns the icon for a failed entity.
    pub fn fail_icon(&self) -> &'static str {
        self.fail
    }

    /// Returns the icon for a skipped entity.
    pub fn skip_icon(&self) -> &'static str {
        self.skip
    }

    /// Returns the icon for an interrupted entity.
    pub fn interrupted_icon(&self) -> &'static str {
        self.interrupted
    }
}
