//! Configuration and log file locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/ui-validation/`
//! - macOS: `~/Library/Application Support/ui-validation/`
//! - Windows: `%APPDATA%\ui-validation\`

use std::path::PathBuf;

/// Application name used for every per-user directory
const APP_NAME: &str = "ui-validation";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "UI_VALIDATION_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `UI_VALIDATION_CONFIG` takes precedence over the per-user location.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the log directory
pub fn log_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join("logs"))
}
