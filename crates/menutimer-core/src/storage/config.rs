//! TOML-based application configuration.
//!
//! Holds:
//! - The duration offered when no duration is given
//! - The step used when extending a running timer
//! - The preset list
//! - The default log filter
//!
//! The file lives at `~/.config/menutimer/config.toml` unless
//! `MENUTIMER_CONFIG` points elsewhere. It is only ever read here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::config_path;
use crate::error::ConfigError;
use crate::presets::{PresetTimers, MAX_PRESETS};
use crate::timer::StandardTimerPolicy;

/// Countdown defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default)]
    pub default_seconds: u32,
    #[serde(default = "default_add_time_step")]
    pub add_time_step_secs: u64,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub presets: PresetTimers,
}

fn default_minutes() -> u32 {
    25
}
fn default_add_time_step() -> u64 {
    60
}
fn default_log_filter() -> String {
    "warn".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            default_seconds: 0,
            add_time_step_secs: default_add_time_step(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            timer: TimerConfig::default(),
            presets: PresetTimers::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema or
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from `path`, or return the default if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from the default location.
    ///
    /// # Errors
    ///
    /// See [`load_from`](Self::load_from).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Check values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        StandardTimerPolicy
            .validate(self.timer.default_minutes, self.timer.default_seconds)
            .map_err(|e| ConfigError::InvalidValue {
                key: "timer".into(),
                message: e.to_string(),
            })?;

        if self.timer.add_time_step_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.add_time_step_secs".into(),
                message: "must be greater than zero".into(),
            });
        }

        if self.presets.len() > MAX_PRESETS {
            return Err(ConfigError::InvalidValue {
                key: "presets".into(),
                message: format!("at most {MAX_PRESETS} presets are allowed"),
            });
        }

        for (i, preset) in self.presets.iter().enumerate() {
            StandardTimerPolicy
                .validate(preset.minutes, preset.seconds)
                .map_err(|e| ConfigError::InvalidValue {
                    key: format!("presets.{i}"),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array entries are addressed by index, e.g. `presets.0.name`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
