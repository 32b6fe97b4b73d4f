//! Configuration management for the waypoint graph server
//!
//! Settings are read from a TOML file, then overridden by `WG_*` environment
//! variables, then validated. Every section has working defaults so the
//! server starts without a config file.

use crate::core::error::{Error, Result};
use crate::storage::importer::{ImportOptions, DEFAULT_MATCH_TOLERANCE, DEFAULT_MAX_IMPORT_BYTES};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "waypoint-graph.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Graph behaviour
    pub graph: GraphConfig,

    /// Flat file storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Directory served under `/static` (map front-end), if any
    pub static_dir: Option<PathBuf>,
}

/// Graph configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Absolute coordinate tolerance used to match nodes on import
    pub match_tolerance: f64,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for exported and uploaded graph files
    pub data_dir: PathBuf,

    /// File name used for exports inside `data_dir`
    pub export_file: String,

    /// Largest accepted import body (bytes)
    pub max_import_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            static_dir: None,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            match_tolerance: DEFAULT_MATCH_TOLERANCE,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./uploads"),
            export_file: "graph.txt".to_string(),
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file (if present) and environment
    pub fn load() -> Result<Self> {
        let mut config = if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without overrides or validation
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse TOML text without overrides or validation
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment in production)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(addr) = lookup("WG_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(data_dir) = lookup("WG_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(max) = lookup("WG_MAX_IMPORT_BYTES") {
            self.storage.max_import_bytes = max
                .parse()
                .map_err(|e| Error::config(format!("Invalid max import bytes: {}", e)))?;
        }

        if let Some(tolerance) = lookup("WG_MATCH_TOLERANCE") {
            self.graph.match_tolerance = tolerance
                .parse()
                .map_err(|e| Error::config(format!("Invalid match tolerance: {}", e)))?;
        }

        if let Some(level) = lookup("WG_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.import_options().validate()?;

        if self.storage.export_file.is_empty()
            || self.storage.export_file.contains(|c: char| c == '/' || c == '\\')
        {
            return Err(Error::config("Export file must be a plain file name"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }

    /// Import options derived from graph and storage settings
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            tolerance: self.graph.match_tolerance,
            max_bytes: self.storage.max_import_bytes,
        }
    }

    /// Full path of the export file
    pub fn export_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.export_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.graph.match_tolerance, 1e-6);
        assert_eq!(config.export_path(), PathBuf::from("./uploads/graph.txt"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            http_addr = "127.0.0.1:8088"

            [graph]
            match_tolerance = 0.001
            "#,
        )
        .unwrap();
        assert_eq!(config.server.http_addr.port(), 8088);
        assert_eq!(config.graph.match_tolerance, 0.001);
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.import_options().tolerance, 0.001);
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WG_HTTP_ADDR", "127.0.0.1:9000"),
            ("WG_MATCH_TOLERANCE", "1e-4"),
            ("WG_MAX_IMPORT_BYTES", "1024"),
            ("WG_LOG_LEVEL", "debug"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.http_addr.port(), 9000);
        assert_eq!(config.graph.match_tolerance, 1e-4);
        assert_eq!(config.storage.max_import_bytes, 1024);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_override_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "WG_MATCH_TOLERANCE").then(|| "tiny".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = Config::default();
        config.graph.match_tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.export_file = "../escape.txt".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint-graph.toml");
        std::fs::write(&path, "[storage]\nexport_file = \"routes.txt\"\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage.export_file, "routes.txt");
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }
}
