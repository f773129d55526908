// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display-related user configuration.

use crate::reporter::InterruptedIcon;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// The smallest redraw interval accepted.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// UI configuration as written in a user config file.
///
/// All fields are optional; unspecified fields fall back to the defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(in crate::user_config) struct DeserializedUiConfig {
    #[serde(default, with = "humantime_serde::option")]
    pub(in crate::user_config) slow_threshold: Option<Duration>,
    pub(in crate::user_config) max_output_lines: Option<usize>,
    #[serde(default, with = "humantime_serde::option")]
    pub(in crate::user_config) tick_interval: Option<Duration>,
    pub(in crate::user_config) interrupted_icon: Option<InterruptedIcon>,
    pub(in crate::user_config) channel_capacity: Option<usize>,
}

/// UI configuration from the embedded defaults. Every field is required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(in crate::user_config) struct DefaultUiConfig {
    #[serde(with = "humantime_serde")]
    slow_threshold: Duration,
    max_output_lines: usize,
    #[serde(with = "humantime_serde")]
    tick_interval: Duration,
    interrupted_icon: InterruptedIcon,
    channel_capacity: usize,
}

/// Resolved UI configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct UiConfig {
    /// Tests at least this slow are listed in the summary.
    pub slow_threshold: Duration,

    /// The number of most recent output lines shown under each running test.
    pub max_output_lines: usize,

    /// How often the live view is redrawn.
    pub tick_interval: Duration,

    /// The icon policy for interrupted packages.
    pub interrupted_icon: InterruptedIcon,

    /// The capacity of the channel between the input reader and the display.
    pub channel_capacity: usize,
}

impl UiConfig {
    /// Applies the user's settings on top of the defaults.
    pub(in crate::user_config) fn resolve(
        default_config: &DefaultUiConfig,
        user_config: Option<&DeserializedUiConfig>,
    ) -> Self {
        let user = user_config.cloned().unwrap_or_default();

        let mut tick_interval = user.tick_interval.unwrap_or(default_config.tick_interval);
        if tick_interval < MIN_TICK_INTERVAL {
            warn!(
                "ui.tick-interval of {} is too short, using {}",
                humantime::format_duration(tick_interval),
                humantime::format_duration(MIN_TICK_INTERVAL),
            );
            tick_interval = MIN_TICK_INTERVAL;
        }

        let mut channel_capacity = user
            .channel_capacity
            .unwrap_or(default_config.channel_capacity);
        if channel_capacity == 0 {
            warn!("ui.channel-capacity must be at least 1, using 1");
            channel_capacity = 1;
        }

        Self {
            slow_threshold: user.slow_threshold.unwrap_or(default_config.slow_threshold),
            max_output_lines: user
                .max_output_lines
                .unwrap_or(default_config.max_output_lines),
            tick_interval,
            interrupted_icon: user
                .interrupted_icon
                .unwrap_or(default_config.interrupted_icon),
            channel_capacity,
        }
    }
}
