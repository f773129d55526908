// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for durations, counts and aligned lines.

use crate::{
    collector::{Counts, Status},
    helpers::{ANSI_RESET, ensure_reset, text_width, truncate_ansi_aware, usize_decimal_char_width},
    reporter::helpers::Styles,
    time::{Timestamp, duration_between, rescale},
};
use owo_colors::OwoColorize;
use std::{fmt, time::Duration};

/// The gap between the left and right halves of an aligned line.
const GUTTER: &str = "  ";

/// Displays an elapsed time in the compact form used by the live view and the summary.
///
/// * Under 50ms: `0.0s`.
/// * Under a minute: seconds with one decimal, e.g. `12.3s`.
/// * Otherwise: minutes with one decimal, e.g. `2.5m`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DisplayElapsed(pub(crate) Duration);

impl fmt::Display for DisplayElapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Buffer the output so the caller's width and alignment apply to the whole value.
        let out = if self.0 < Duration::from_millis(50) {
            "0.0s".to_owned()
        } else if self.0 < Duration::from_secs(60) {
            format!("{:.1}s", self.0.as_secs_f64())
        } else {
            format!("{:.1}m", self.0.as_secs_f64() / 60.0)
        };
        f.pad(&out)
    }
}

/// Returns the elapsed time to display for an entity.
///
/// Entities that are still going (and interrupted ones that never recorded a time) show the time
/// since they were first observed, converted back to original time in replay mode. Everything else
/// shows the time it reported.
pub(crate) fn display_elapsed(
    status: Status,
    recorded: Duration,
    wall_start_time: Timestamp,
    now: Timestamp,
    replay_rate: Option<f64>,
) -> Duration {
    let live = match status {
        Status::Running | Status::Paused => true,
        Status::Interrupted => recorded.is_zero(),
        Status::Unknown | Status::Passed | Status::Failed | Status::Skipped => false,
    };
    if live {
        rescale(duration_between(wall_start_time, now), replay_rate)
    } else {
        recorded
    }
}

/// Widths of the right-hand columns, shared across every line in a frame so they line up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ColumnWidths {
    pub(crate) passed: usize,
    pub(crate) failed: usize,
    pub(crate) skipped: usize,
    pub(crate) elapsed: usize,
}

impl ColumnWidths {
    /// Widens the columns to fit `counts` and `elapsed`.
    pub(crate) fn fit(&mut self, counts: &Counts, elapsed: Duration) {
        self.passed = self.passed.max(usize_decimal_char_width(counts.passed));
        self.failed = self.failed.max(usize_decimal_char_width(counts.failed));
        self.skipped = self.skipped.max(usize_decimal_char_width(counts.skipped));
        self.fit_elapsed(elapsed);
    }

    /// Widens the elapsed column to fit `elapsed`.
    pub(crate) fn fit_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = self.elapsed.max(DisplayElapsed(elapsed).to_string().len());
    }
}

/// The right-hand side of a package or run line: colored counts followed by the elapsed time.
pub(crate) struct DisplayCountsAndElapsed<'a> {
    pub(crate) counts: &'a Counts,
    pub(crate) elapsed: Duration,
    pub(crate) widths: ColumnWidths,
    pub(crate) styles: &'a Styles,
}

impl fmt::Display for DisplayCountsAndElapsed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>pw$} {:>fw$} {:>sw$}{GUTTER}{:>ew$}",
            self.counts.passed.style(self.styles.pass),
            self.counts.failed.style(self.styles.fail),
            self.counts.skipped.style(self.styles.skip),
            DisplayElapsed(self.elapsed),
            pw = self.widths.passed,
            fw = self.widths.failed,
            sw = self.widths.skipped,
            ew = self.widths.elapsed,
        )
    }
}

/// Lays out `prefix` and `left` on the left of a `width`-column line, and `right` flush against
/// the right edge.
///
/// If the two halves don't fit, `left` is truncated. `right` is never truncated, so a very narrow
/// terminal can produce lines wider than `width`.
pub(crate) fn align_line(prefix: &str, left: &str, right: &str, width: usize) -> String {
    let prefix_width = text_width(prefix);
    let right_width = text_width(right);
    let left_budget = width
        .saturating_sub(right_width)
        .saturating_sub(GUTTER.len())
        .saturating_sub(prefix_width);

    let left_width = text_width(left);
    let (left, left_width) = if left_width > left_budget {
        // A wide character at the cut is dropped whole, so measure what's left.
        let truncated = truncate_ansi_aware(left, 0, left_budget);
        let truncated_width = text_width(&truncated);
        (truncated, truncated_width)
    } else {
        (left.to_owned(), left_width)
    };

    let mut line = String::with_capacity(width + 16);
    line.push_str(prefix);
    line.push_str(&left);
    if line.contains('\x1b') {
        line.push_str(ANSI_RESET);
    }
    line.extend(std::iter::repeat_n(' ', left_budget - left_width));
    line.push_str(GUTTER);
    line.push_str(right);
    ensure_reset(line)
}

/// Lays out a line with nothing on the right, truncating it to `width` columns.
pub(crate) fn fit_line(line: &str, width: usize) -> String {
    let line = if text_width(line) > width {
        truncate_ansi_aware(line, 0, width)
    } else {
        line.to_owned()
    };
    ensure_reset(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::text_width;
    use chrono::DateTime;
    use test_case::test_case;

    #[test_case(Duration::ZERO, "0.0s" ; "zero")]
    #[test_case(Duration::from_millis(49), "0.0s" ; "just under threshold")]
    #[test_case(Duration::from_millis(300), "0.3s" ; "fraction")]
    #[test_case(Duration::from_millis(12_340), "12.3s" ; "seconds")]
    #[test_case(Duration::from_millis(59_900), "59.9s" ; "under a minute")]
    #[test_case(Duration::from_secs(60), "1.0m" ; "one minute")]
    #[test_case(Duration::from_secs(150), "2.5m" ; "minutes")]
    fn elapsed_display(duration: Duration, expected: &str) {
        assert_eq!(DisplayElapsed(duration).to_string(), expected);
    }

    #[test]
    fn elapsed_display_respects_width() {
        assert_eq!(format!("{:>6}", DisplayElapsed(Duration::from_secs(1))), "  1.0s");
    }

    #[test_case(Status::Running, Duration::ZERO, Some(0.5), Duration::from_secs(8) ; "running replay")]
    #[test_case(Status::Paused, Duration::ZERO, None, Duration::from_secs(4) ; "paused live")]
    #[test_case(Status::Passed, Duration::from_secs(1), Some(0.5), Duration::from_secs(1) ; "terminal unscaled")]
    #[test_case(Status::Interrupted, Duration::from_secs(3), None, Duration::from_secs(3) ; "interrupted recorded")]
    #[test_case(Status::Interrupted, Duration::ZERO, None, Duration::from_secs(4) ; "interrupted without record")]
    fn elapsed_for_status(
        status: Status,
        recorded: Duration,
        replay_rate: Option<f64>,
        expected: Duration,
    ) {
        let start = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").expect("valid");
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:04Z").expect("valid");
        assert_eq!(
            display_elapsed(status, recorded, start, now, replay_rate),
            expected
        );
    }

    #[test]
    fn align_pads_to_width() {
        let line = align_line("+ ", "pkg", "1 0 0  0.1s", 30);
        assert_eq!(line, format!("+ pkg{}1 0 0  0.1s", " ".repeat(14)));
        assert_eq!(text_width(&line), 30);
    }

    #[test]
    fn align_truncates_left_but_not_right() {
        let line = align_line("+ ", "example.com/a/very/long/package", "0.1s", 20);
        assert_eq!(line, "+ example.com/  0.1s");

        let narrow = align_line("+ ", "pkg", "1 0 0  0.1s", 8);
        assert_eq!(narrow, "+   1 0 0  0.1s");
    }

    #[test]
    fn align_resets_after_styled_left() {
        let line = align_line("\x1b[32m+\x1b[0m ", "\x1b[1mpkg", "1", 10);
        assert_eq!(line, "\x1b[32m+\x1b[0m \x1b[1mpkg\x1b[0m    1\x1b[0m");
        assert_eq!(text_width(&line), 10);
    }

    #[test]
    fn align_line_pads_after_dropping_wide_char() {
        // The budget is 5 columns, which splits the third wide character.
        let line = align_line("+ ", "日本語日本語", "0.1s", 13);
        assert_eq!(line, "+ 日本   0.1s");
        assert_eq!(text_width(&line), 13);
    }

    #[test]
    fn fit_line_truncates() {
        assert_eq!(fit_line("abcdef", 4), "abcd");
        assert_eq!(fit_line("\x1b[31mabcdef", 4), "\x1b[31mabcd\x1b[0m");
    }
}
