//! Configuration management (config.toml)
//!
//! Recorder and player settings stored in TOML format in the platform-specific
//! config directory. Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::player::PlayerConfig;
use crate::recorder::RecorderConfig;

/// File name inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Recording settings
    #[serde(default)]
    pub recorder: RecorderConfig,
    /// Playback settings
    #[serde(default)]
    pub player: PlayerConfig,
}

/// Errors from reading or writing a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\oscscore\config`
/// On macOS: `~/Library/Application Support/org.oscscore.oscscore`
/// On Linux: `~/.config/oscscore`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "oscscore", "oscscore")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring config: {}", e);
            Config::default()
        }
    }
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Unlike [`load`], a missing or malformed file is reported.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = config_dir() {
        save_to(config, dir.join(CONFIG_FILE))?;
    }
    Ok(())
}

/// Saves the configuration to an explicit path, creating parent directories.
pub fn save_to(config: &Config, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.recorder.generator, "oscscore");
        assert_eq!(config.player.lookahead, 60);
    }

    #[test]
    fn test_config_deserialize_empty() {
        // Empty TOML should produce defaults
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_player() {
        let toml_str = r#"
[player]
lookahead = 4
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.player.lookahead, 4);
        assert_eq!(config.recorder.generator, "oscscore"); // default
    }

    #[test]
    fn test_config_deserialize_empty_section() {
        let toml_str = r#"
[recorder]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.recorder, RecorderConfig::default());
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            recorder: RecorderConfig {
                generator: "sketch_0412".to_string(),
            },
            player: PlayerConfig { lookahead: 30 },
        };
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_from_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));

        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[player]\nlookahead = \"many\"\n").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }
}
