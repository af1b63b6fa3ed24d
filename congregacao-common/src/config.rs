//! Configuration loading for the congregation import service
//!
//! Settings sources, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable (`CONGREGACAO_ROSTER`, `CONGREGACAO_PORT`)
//! 3. TOML config file (`~/.config/congregacao/config.toml`)
//! 4. Built-in defaults
//!
//! A missing TOML file is not an error: defaults are used and a warning logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the roster JSON file
pub const ENV_ROSTER: &str = "CONGREGACAO_ROSTER";
/// Environment variable overriding the HTTP port
pub const ENV_PORT: &str = "CONGREGACAO_PORT";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Roster JSON file (`[{"id": ..., "nome": ...}]`)
    #[serde(default)]
    pub roster_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            roster_path: None,
            port: default_port(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_port() -> u16 {
    5780
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from an explicit path; the file must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load from `path` if given, else the default location; defaults when absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                warn!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Default configuration file path (`<config_dir>/congregacao/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("congregacao").join("config.toml"))
}

/// Roster file resolution: CLI → ENV → TOML
///
/// Returns `None` when no source names a roster; the service then runs with
/// an empty roster and every name stays unresolved.
pub fn resolve_roster_path(cli_arg: Option<&Path>, toml: &TomlConfig) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(ENV_ROSTER) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path.trim()));
        }
    }
    toml.roster_path.clone()
}

/// Port resolution: CLI → ENV → TOML (which carries the built-in default)
pub fn resolve_port(cli_arg: Option<u16>, toml: &TomlConfig) -> Result<u16> {
    if let Some(port) = cli_arg {
        return Ok(port);
    }
    if let Ok(value) = std::env::var(ENV_PORT) {
        return value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid port: {}", ENV_PORT, value)));
    }
    Ok(toml.port)
}
