mod config;

pub use config::{Config, TimerConfig};

use std::path::PathBuf;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "MENUTIMER_CONFIG";

/// Returns `$MENUTIMER_CONFIG`, or `~/.config/menutimer/config.toml`.
///
/// Falls back to the working directory when no home directory is known.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("menutimer")
        .join("config.toml")
}
