//! # Application Configuration
//!
//! Optional TOML configuration file for the server. Command-line flags
//! take precedence over file values, which take precedence over the
//! built-in defaults.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [storage]
//! data_dir = "veritrack-data"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use veritrack_core::VeritrackError;

// =============================================================================
// CONFIG STRUCTURES
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("veritrack-data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, VeritrackError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VeritrackError::ConfigError(format!("Read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            VeritrackError::ConfigError(format!("Parse config '{}': {}", path.display(), e))
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
