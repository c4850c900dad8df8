//! Configuration loading for the Straylight engine.
//!
//! Loads `straylight.toml` with per-section defaults. All sections use
//! `#[serde(default)]` so a minimal or empty config file is valid, and a
//! missing file falls back to defaults entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::engine::EngineSettings;
use crate::policy::ThresholdPreset;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StraylightConfig {
    /// Protection behavior.
    #[serde(default)]
    pub protection: ProtectionConfig,

    /// Aggregator reporting target.
    #[serde(default)]
    pub aggregator: AggregatorConfig,

    /// Remote autonomy check target and bound.
    #[serde(default)]
    pub autonomy: AutonomyConfig,

    /// Daemon-mode timing.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Protection behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtectionConfig {
    /// Master switch. When off, pages are analyzed and reported but the
    /// overlay never triggers.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Risk-level gate preset.
    #[serde(default)]
    pub preset: ThresholdPreset,

    /// Neutral destination for the "Leave Site" action.
    #[serde(default = "default_leave_url")]
    pub leave_url: String,
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: ThresholdPreset::default(),
            leave_url: default_leave_url(),
        }
    }
}

/// Aggregator reporting target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregatorConfig {
    /// Endpoint URL for report submission. Reporting is disabled when
    /// unset.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Remote autonomy check settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AutonomyConfig {
    /// Endpoint URL for the allow-or-redirect call. Every intervention is
    /// allowed locally when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Milliseconds before the call fails open.
    #[serde(default = "default_autonomy_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_autonomy_timeout_ms(),
        }
    }
}

/// Daemon-mode timing.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Seconds between snapshot-directory polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds between session bookkeeping ticks.
    #[serde(default = "default_session_tick_secs")]
    pub session_tick_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            session_tick_secs: default_session_tick_secs(),
        }
    }
}

/// A configuration value outside its sane bounds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL field does not parse.
    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A numeric field is outside its allowed range.
    #[error("{field} must be within {range}: got {value}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// The allowed range, human-readable.
        range: &'static str,
        /// The rejected value.
        value: u64,
    },
}

impl StraylightConfig {
    /// Validate that configuration values are within sane bounds.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.protection.leave_url).is_err() {
            return Err(ConfigError::InvalidUrl {
                field: "protection.leave_url",
                value: self.protection.leave_url.clone(),
            });
        }

        for (field, endpoint) in [
            ("aggregator.endpoint", &self.aggregator.endpoint),
            ("autonomy.endpoint", &self.autonomy.endpoint),
        ] {
            if let Some(value) = endpoint {
                if url::Url::parse(value).is_err() {
                    return Err(ConfigError::InvalidUrl {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }

        if !(100..=10_000).contains(&self.autonomy.timeout_ms) {
            return Err(ConfigError::OutOfRange {
                field: "autonomy.timeout_ms",
                range: "[100, 10000]",
                value: self.autonomy.timeout_ms,
            });
        }

        if self.watch.poll_interval_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "watch.poll_interval_secs",
                range: "[1, ..)",
                value: self.watch.poll_interval_secs,
            });
        }

        if self.watch.session_tick_secs == 0 {
            return Err(ConfigError::OutOfRange {
                field: "watch.session_tick_secs",
                range: "[1, ..)",
                value: self.watch.session_tick_secs,
            });
        }

        Ok(())
    }

    /// Derive the engine settings from the protection and autonomy
    /// sections.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            enabled: self.protection.enabled,
            preset: self.protection.preset,
            leave_url: self.protection.leave_url.clone(),
            autonomy_timeout: Duration::from_millis(self.autonomy.timeout_ms),
        }
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails
/// validation.
pub fn load_config(path: &Path) -> anyhow::Result<StraylightConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: StraylightConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from the default path, or defaults when the file
/// does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be loaded, or if the
/// config directory cannot be determined.
pub fn load_or_default() -> anyhow::Result<StraylightConfig> {
    let path = default_config_path()?;
    if path.exists() {
        load_config(&path)
    } else {
        Ok(StraylightConfig::default())
    }
}

/// Resolve the default config file path under the user config directory.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "straylight")
        .context("could not determine home directory")?;
    Ok(dirs.config_dir().join("straylight.toml"))
}

/// Resolve the log directory for daemon mode.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_log_dir() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "straylight")
        .context("could not determine home directory")?;
    Ok(dirs.data_dir().join("logs"))
}

// Default value functions for serde.

fn default_true() -> bool {
    true
}

fn default_leave_url() -> String {
    "about:blank".to_owned()
}

fn default_autonomy_timeout_ms() -> u64 {
    1500
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_session_tick_secs() -> u64 {
    5
}
