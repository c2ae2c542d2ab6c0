//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pwroute_pipewire::ToolPaths;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// PipeWire tool locations
    #[serde(default)]
    pub tools: ToolPaths,
    /// Watch settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log tool invocations at debug instead of info
    #[serde(default)]
    pub quiet: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), quiet: false }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Minimum milliseconds between two change notifications
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: default_interval_ms() }
    }
}

impl WatchConfig {
    /// Notification interval as a duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    10
}

/// Load configuration from an explicit file, the default location, or defaults.
///
/// An explicit path must exist; a missing default file is not an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_from(path),
        None => {
            let path = config_path()?;
            if path.exists() { load_from(&path) } else { Ok(Config::default()) }
        }
    }
}

fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {path:?}"))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {path:?}"))
}

/// Get the configuration file path.
pub fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "pwroute", "pwroute")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write config");
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "warn");
        assert!(!config.general.quiet);
        assert_eq!(config.tools.pw_link, "pw-link");
        assert_eq!(config.tools.pw_mon, "pw-mon");
        assert_eq!(config.watch.interval(), Duration::from_millis(10));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[tools]
pw_link = "/usr/local/bin/pw-link"

[watch]
interval_ms = 250
"#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.tools.pw_link, "/usr/local/bin/pw-link");
        assert_eq!(config.tools.pw_cli, "pw-cli");
        assert_eq!(config.watch.interval(), Duration::from_millis(250));
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn test_general_section() {
        let file = write_config("[general]\nlog_level = \"debug\"\nquiet = true\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!(config.general.quiet);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(missing.as_path())).is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = write_config("[watch]\ninterval_ms = \"soon\"\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
