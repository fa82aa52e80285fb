//! Configuration loading for tictac.
//!
//! Configuration is loaded from a TOML file (default: `tictac.toml`, used
//! only when present). Every field has a default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tictac_match_client::{SessionConfig, DEFAULT_RELAY_ADDRESS};
use tictac_match_types::{RoomId, DEFAULT_ROOM};

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "tictac.toml";

/// Root configuration for tictac.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Well-known room to race for.
    #[serde(default = "default_room")]
    pub room: String,
    /// Relay address.
    #[serde(default = "default_relay_address")]
    pub relay_address: String,
    /// Username for the first demo player (random if unset).
    #[serde(default)]
    pub username: Option<String>,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// Default value functions
fn default_room() -> String {
    DEFAULT_ROOM.to_string()
}

fn default_relay_address() -> String {
    DEFAULT_RELAY_ADDRESS.to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            room: default_room(),
            relay_address: default_relay_address(),
            username: None,
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `explicit` if given, else `tictac.toml` if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Session configuration for one player.
    ///
    /// `room` overrides the configured room.
    pub fn session_config(&self, room: Option<&str>, username: Option<&str>) -> SessionConfig {
        let room = RoomId::new(room.unwrap_or(&self.room));
        let config = SessionConfig::new(room).with_relay_address(&self.relay_address);
        match username {
            Some(name) => config.with_username(name),
            None => config,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        let config = CliConfig::default();
        assert_eq!(config.room, "tictactoe_room_1");
        assert_eq!(config.relay_address, "local");
        assert_eq!(config.log_filter, "warn");
        assert!(config.username.is_none());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
room = "friday_night"
relay_address = "relay.example:7350"
username = "alice"
log_filter = "tictac_match_client=debug"
"#;

        let config: CliConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.room, "friday_night");
        assert_eq!(config.relay_address, "relay.example:7350");
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.log_filter, "tictac_match_client=debug");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tictac.toml");
        std::fs::write(&path, "room = \"room1\"\n").unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.room, "room1");
        assert_eq!(config.relay_address, "local");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = CliConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "room = [unterminated").unwrap();

        let err = CliConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CliConfig, _> = toml::from_str("colour = \"blue\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn session_config_applies_overrides() {
        let config = CliConfig::default();
        let session = config.session_config(Some("room9"), Some("bob"));
        assert_eq!(session.room, RoomId::new("room9"));
        assert_eq!(session.username, "bob");
        assert_eq!(session.relay_address, "local");

        let session = config.session_config(None, None);
        assert_eq!(session.room, RoomId::default());
        assert!(session.username.starts_with("player_"));
    }
}
