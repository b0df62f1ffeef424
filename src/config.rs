//! Configuration loading.
//!
//! Settings live in `conf/config.toml`. Any missing or invalid entries fall
//! back to defaults so the preview can still run without a config file.

use crate::sources::ReaderSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Highlight bookmarked verses after the geometry loads.
    #[serde(default = "default_highlight_bookmarks")]
    pub highlight_bookmarks: bool,
    /// Request the dual-page (tablet) geometry variant.
    #[serde(default)]
    pub tablet_mode: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            highlight_bookmarks: default_highlight_bookmarks(),
            tablet_mode: false,
            log_level: LogLevel::default(),
        }
    }
}

impl ReaderSettings for AppConfig {
    fn highlight_bookmarks(&self) -> bool {
        self.highlight_bookmarks
    }
}

fn default_highlight_bookmarks() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Load configuration from `path`, falling back to defaults when the file is
/// absent or malformed.
pub fn load_config(path: &Path) -> AppConfig {
    let Ok(data) = fs::read_to_string(path) else {
        info!(path = %path.display(), "No config file; using defaults");
        return AppConfig::default();
    };
    match toml::from_str(&data) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), "Ignoring malformed config: {err}");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config, AppConfig::default());
        assert!(config.highlight_bookmarks);
        assert!(!config.tablet_mode);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            "highlight_bookmarks = false\nlog_level = \"debug\"\n",
        )
        .expect("partial config should parse");
        assert!(!config.highlight_bookmarks);
        assert!(!config.tablet_mode);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_level.as_filter_str(), "debug");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir should be available");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "highlight_bookmarks = \"maybe\"").expect("file should write");
        assert_eq!(load_config(&path), AppConfig::default());
    }
}
