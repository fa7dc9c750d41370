//! Core error types for menutimer-core.
//!
//! Every command on the countdown store returns a typed [`TimerError`];
//! the remaining enums cover presets and configuration. [`CoreError`]
//! gathers all of them for callers that only want one error type.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for menutimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Countdown command rejected
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Preset-related errors
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Outcome of a rejected countdown command.
///
/// All variants are local validation failures. The store is left exactly
/// as it was before the command was issued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The requested total duration is negative or does not fit.
    #[error("requested duration is negative")]
    InvalidDuration,

    /// A session is already running or paused.
    #[error("a timer is already running")]
    TimerAlreadyRunning,

    /// There is no running or paused session to act on.
    #[error("no active timer")]
    NoActiveTimer,

    /// `add_time` was called with zero or a negative amount.
    #[error("amount must be a positive number of seconds")]
    InvalidAmount,
}

/// Preset-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    /// The preset list is full
    #[error("cannot hold more than {max} presets")]
    MaxPresetsReached { max: usize },

    /// No preset with this id
    #[error("preset {0} not found")]
    NotFound(Uuid),

    /// Minutes or seconds fall outside the accepted input range
    #[error("invalid preset duration {minutes}m {seconds}s")]
    InvalidDuration { minutes: u32, seconds: u32 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Failed to render configuration as TOML
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SerializeFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
