// Copyright (c) The livetest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    discovery::user_config_paths,
    elements::{DefaultUiConfig, DeserializedUiConfig, UiConfig},
};
use crate::errors::UserConfigError;
use camino::Utf8Path;
use serde::Deserialize;
use std::{collections::BTreeSet, io};
use tracing::{debug, warn};

/// Special value for `--user-config-file` and `LIVETEST_USER_CONFIG_FILE` that skips user config
/// loading entirely.
pub const USER_CONFIG_NONE: &str = "none";

/// Specifies where to load user configuration from.
#[derive(Clone, Copy, Debug)]
pub enum UserConfigLocation<'a> {
    /// Discover user config from default locations (e.g. `~/.config/livetest/config.toml`).
    Default,

    /// Skip user config loading entirely, using only built-in defaults.
    Isolated,

    /// Load user config from an explicit path. It is an error for the file not to exist.
    Explicit(&'a Utf8Path),
}

impl<'a> UserConfigLocation<'a> {
    /// Creates a user config location from a CLI or environment variable value.
    ///
    /// Returns `Default` if `None`, `Isolated` if `"none"`, otherwise `Explicit` with the path.
    pub fn from_cli_or_env(s: Option<&'a str>) -> Self {
        match s {
            None => Self::Default,
            Some(s) if s == USER_CONFIG_NONE => Self::Isolated,
            Some(s) => Self::Explicit(Utf8Path::new(s)),
        }
    }
}

/// User configuration after defaults have been applied.
#[derive(Clone, Debug, PartialEq)]
pub struct UserConfig {
    /// Resolved UI configuration.
    pub ui: UiConfig,
}

impl UserConfig {
    /// Loads and resolves user configuration from `location`.
    pub fn load(location: UserConfigLocation<'_>) -> Result<Self, UserConfigError> {
        Self::load_with_warnings(location, &mut DefaultUserConfigWarnings)
    }

    fn load_with_warnings(
        location: UserConfigLocation<'_>,
        warnings: &mut impl UserConfigWarnings,
    ) -> Result<Self, UserConfigError> {
        let user_config = DeserializedUserConfig::from_location(location, warnings)?;
        let default_user_config = DefaultUserConfig::from_embedded();

        Ok(Self {
            ui: UiConfig::resolve(
                &default_user_config.ui,
                user_config.as_ref().map(|config| &config.ui),
            ),
        })
    }
}

/// Handles warnings produced while loading user config.
trait UserConfigWarnings {
    /// Handle unknown configuration keys found in a user config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs warnings through `tracing`.
struct DefaultUserConfigWarnings;

impl UserConfigWarnings for DefaultUserConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if let (1, Some(key)) = (unknown.len(), unknown.first()) {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.push_str(key);
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push('\n');
                unknown_str.push_str("  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!("in user config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedUserConfig {
    #[serde(default)]
    ui: DeserializedUiConfig,
}

impl DeserializedUserConfig {
    fn from_location(
        location: UserConfigLocation<'_>,
        warnings: &mut impl UserConfigWarnings,
    ) -> Result<Option<Self>, UserConfigError> {
        match location {
            UserConfigLocation::Isolated => {
                debug!("user config: skipping (isolated)");
                Ok(None)
            }
            UserConfigLocation::Explicit(path) => {
                debug!("user config: loading from explicit path {path}");
                match Self::from_path_with_warnings(path, warnings)? {
                    Some(config) => Ok(Some(config)),
                    None => Err(UserConfigError::FileNotFound {
                        path: path.to_owned(),
                    }),
                }
            }
            UserConfigLocation::Default => {
                let paths = user_config_paths()?;
                for path in &paths {
                    if let Some(config) = Self::from_path_with_warnings(path, warnings)? {
                        return Ok(Some(config));
                    }
                }
                debug!("user config: no config file found at any candidate path: {paths:?}");
                Ok(None)
            }
        }
    }

    /// Loads user config from a specific path.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl UserConfigWarnings,
    ) -> Result<Option<Self>, UserConfigError> {
        debug!("user config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("user config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(UserConfigError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            Self::deserialize_toml(&contents).map_err(|error| UserConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("user config: loaded successfully from {path}");
        Ok(Some(config))
    }

    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: DeserializedUserConfig = serde_ignored::deserialize(deserializer, |path| {
            unknown.insert(path.to_string());
        })?;
        Ok((config, unknown))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultUserConfig {
    ui: DefaultUiConfig,
}

impl DefaultUserConfig {
    /// The embedded default user config TOML.
    const DEFAULT_CONFIG: &'static str = include_str!("../../default-user-config.toml");

    /// Parses the default config.
    ///
    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let deserializer = toml::Deserializer::parse(Self::DEFAULT_CONFIG)
            .expect("embedded default user config should parse");
        let mut unknown = BTreeSet::new();
        let config: DefaultUserConfig =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .expect("embedded default user config should be valid");

        // The default config ships with the binary, so unknown keys are a bug.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default user config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{DEFAULT_MAX_OUTPUT_LINES, DEFAULT_SLOW_THRESHOLD, InterruptedIcon};
    use camino::Utf8PathBuf;
    use camino_tempfile::tempdir;
    use std::time::Duration;

    #[derive(Default)]
    struct TestUserConfigWarnings {
        unknown_keys: Option<(Utf8PathBuf, BTreeSet<String>)>,
    }

    impl UserConfigWarnings for TestUserConfigWarnings {
        fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
            self.unknown_keys = Some((config_file.to_owned(), unknown.clone()));
        }
    }

    #[test]
    fn default_user_config_matches_constants() {
        let config = UserConfig::load(UserConfigLocation::Isolated).expect("defaults load");
        assert_eq!(
            config.ui,
            UiConfig {
                slow_threshold: DEFAULT_SLOW_THRESHOLD,
                max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
                tick_interval: Duration::from_millis(100),
                interrupted_icon: InterruptedIcon::Heuristic,
                channel_capacity: 1024,
            }
        );
    }

    #[test]
    fn user_settings_override_defaults() {
        let temp_dir = tempdir().expect("tempdir created");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
            [ui]
            slow-threshold = "2s"
            interrupted-icon = "fixed"
            tick-interval = "1ms"
            channel-capacity = 0
            "#,
        )
        .expect("config written");

        let mut warnings = TestUserConfigWarnings::default();
        let config =
            UserConfig::load_with_warnings(UserConfigLocation::Explicit(&config_path), &mut warnings)
                .expect("config valid");
        assert_eq!(config.ui.slow_threshold, Duration::from_secs(2));
        assert_eq!(config.ui.interrupted_icon, InterruptedIcon::Fixed);
        assert_eq!(config.ui.max_output_lines, DEFAULT_MAX_OUTPUT_LINES);
        // Out-of-range values are clamped.
        assert_eq!(config.ui.tick_interval, Duration::from_millis(10));
        assert_eq!(config.ui.channel_capacity, 1);
        assert!(warnings.unknown_keys.is_none());
    }

    #[test]
    fn ignored_keys() {
        let config_contents = r#"
        ignored1 = "test"

        [ui]
        max-output-lines = 3
        ignored2 = "hi"
        "#;

        let temp_dir = tempdir().expect("tempdir created");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config_contents).expect("config written");

        let mut warnings = TestUserConfigWarnings::default();
        let config = DeserializedUserConfig::from_path_with_warnings(&config_path, &mut warnings)
            .expect("config valid")
            .expect("config should be loaded");
        assert_eq!(config.ui.max_output_lines, Some(3));

        let (path, unknown) = warnings.unknown_keys.expect("should have unknown keys");
        assert_eq!(path, config_path);
        assert_eq!(
            unknown,
            BTreeSet::from(["ignored1".to_owned(), "ui.ignored2".to_owned()])
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp_dir = tempdir().expect("tempdir created");
        let config_path = temp_dir.path().join("does-not-exist.toml");

        let error = UserConfig::load(UserConfigLocation::Explicit(&config_path))
            .expect_err("missing explicit file is an error");
        assert!(
            matches!(error, UserConfigError::FileNotFound { ref path } if *path == config_path),
            "unexpected error: {error:?}"
        );
    }

    #[test]
    fn parse_errors_are_reported() {
        let temp_dir = tempdir().expect("tempdir created");
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[ui]\nslow-threshold = \"soon\"\n").expect("config written");

        let error = UserConfig::load(UserConfigLocation::Explicit(&config_path))
            .expect_err("invalid duration is an error");
        assert!(matches!(error, UserConfigError::Parse { .. }), "{error:?}");
    }

    #[test]
    fn location_from_cli() {
        assert!(matches!(
            UserConfigLocation::from_cli_or_env(None),
            UserConfigLocation::Default
        ));
        assert!(matches!(
            UserConfigLocation::from_cli_or_env(Some("none")),
            UserConfigLocation::Isolated
        ));
        assert!(matches!(
            UserConfigLocation::from_cli_or_env(Some("/tmp/livetest.toml")),
            UserConfigLocation::Explicit(path) if path == "/tmp/livetest.toml"
        ));
    }
}
