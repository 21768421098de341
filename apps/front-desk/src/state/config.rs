//! # Front Desk Configuration
//!
//! Configuration loaded once at startup, read-only afterwards.
//!
//! ## Configuration Sources (Later Wins)
//! 1. Defaults (this file)
//! 2. Config file (`--config <path>`, or `front-desk.toml` in the platform
//!    config directory)
//! 3. Environment variables (`INNKEEP_*`)
//!
//! The 19% VAT rate is not configurable; it lives in `innkeep_core::VAT_RATE`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use innkeep_db::DbConfig;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "front-desk.toml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontDeskConfig {
    /// Hotel name (shown by `GET /api/config`)
    pub hotel_name: String,

    /// Interface to listen on
    pub bind_addr: String,

    pub port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for SQLite's lock, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for FrontDeskConfig {
    /// Returns default configuration suitable for development.
    fn default() -> Self {
        FrontDeskConfig {
            hotel_name: "Innkeep Dev Hotel".to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            db_path: default_db_path(),
            max_connections: 5,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

impl FrontDeskConfig {
    /// Loads defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, the platform config file
    /// is used only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match platform_config_file().filter(|p| p.exists()) {
                Some(found) => Self::from_file(&found)?,
                None => FrontDeskConfig::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        info!(
            hotel = %config.hotel_name,
            db_path = %config.db_path.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Reads a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Reading config file");

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `INNKEEP_*` overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = lookup("INNKEEP_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup("INNKEEP_BIND_ADDR") {
            self.bind_addr = addr;
        }

        if let Some(port) = lookup("INNKEEP_PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("INNKEEP_PORT".to_string()))?;
        }

        if let Some(name) = lookup("INNKEEP_HOTEL_NAME") {
            self.hotel_name = name;
        }

        if let Some(max) = lookup("INNKEEP_MAX_CONNECTIONS") {
            self.max_connections = max
                .parse()
                .map_err(|_| ConfigError::InvalidValue("INNKEEP_MAX_CONNECTIONS".to_string()))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.hotel_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("hotel_name".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))
    }

    /// Database settings for `innkeep_db::Database::new`.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

/// Platform config file.
///
/// - **macOS**: `~/Library/Application Support/com.innkeep.front-desk/front-desk.toml`
/// - **Linux**: `~/.config/front-desk/front-desk.toml`
fn platform_config_file() -> Option<PathBuf> {
    ProjectDirs::from("com", "innkeep", "front-desk").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Database file in the platform data directory, or the working directory
/// when no home directory is known.
fn default_db_path() -> PathBuf {
    ProjectDirs::from("com", "innkeep", "front-desk")
        .map(|dirs| dirs.data_dir().join("innkeep.db"))
        .unwrap_or_else(|| PathBuf::from("innkeep.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = FrontDeskConfig::default();
        config.validate().unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_toml_keeps_missing_defaults() {
        let config = FrontDeskConfig::from_toml(
            r#"
            hotel_name = "Hotel Andino"
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.hotel_name, "Hotel Andino");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = FrontDeskConfig::from_toml("port = 9000").unwrap();
        let env: HashMap<&str, &str> = [
            ("INNKEEP_PORT", "7000"),
            ("INNKEEP_DB_PATH", "/tmp/hotel.db"),
            ("INNKEEP_HOTEL_NAME", "Posada"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.db_path, PathBuf::from("/tmp/hotel.db"));
        assert_eq!(config.hotel_name, "Posada");
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = FrontDeskConfig::default();
        let err = config
            .apply_env(|key| (key == "INNKEEP_MAX_CONNECTIONS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(field) if field == "INNKEEP_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_validation() {
        let mut config = FrontDeskConfig::default();
        config.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = FrontDeskConfig::default();
        config.hotel_name = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = FrontDeskConfig::default();
        config.bind_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }
}
