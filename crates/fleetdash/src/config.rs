//! Configuration management for fleetdash.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fleetdash";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fleet.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "FLEETDASH_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETDASH_`, sections split on `__`)
/// 2. TOML config file at `~/.config/fleetdash/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dashboard configuration.
    pub analytics: AnalyticsConfig,
    /// List endpoint paging.
    pub pagination: PaginationConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed by CORS. `"*"` allows any origin; other entries
    /// must be `http://` or `https://` origins.
    pub cors_origins: Vec<String>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fleetdash/fleet.db`
    pub database_path: PathBuf,
    /// Keep everything in memory; nothing survives a restart.
    pub in_memory: bool,
    /// Load the demo fleet into an empty database.
    pub seed_demo_data: bool,
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of activity entries shown on the dashboard.
    pub recent_activity_limit: usize,
}

/// Paging for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when a page is requested without `perPage`.
    pub default_per_page: usize,
    /// Upper bound for `perPage`.
    pub max_per_page: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: Config::default_data_dir().join(DATABASE_FILE_NAME),
            in_memory: false,
            seed_demo_data: true,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_activity_limit: 10,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

impl ServerConfig {
    /// The socket address to listen on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FLEETDASH_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load only the given TOML file on top of the defaults, ignoring the
    /// environment. Used to check a file before deploying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparseable or invalid.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigValidation {
                message: format!("config file not found: {}", path.display()),
            });
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.cors_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "server.cors_origins must not contain empty entries".to_string(),
            });
        }

        if let Some(origin) = self.server.cors_origins.iter().find(|o| !valid_origin(o)) {
            return Err(Error::ConfigValidation {
                message: format!("server.cors_origins contains an invalid origin: {origin:?}"),
            });
        }

        if !self.storage.in_memory && self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "storage.database_path must be set unless storage.in_memory is on"
                    .to_string(),
            });
        }

        if self.analytics.recent_activity_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "analytics.recent_activity_limit must be greater than 0".to_string(),
            });
        }

        if self.pagination.default_per_page == 0 || self.pagination.max_per_page == 0 {
            return Err(Error::ConfigValidation {
                message: "pagination sizes must be greater than 0".to_string(),
            });
        }

        if self.pagination.default_per_page > self.pagination.max_per_page {
            return Err(Error::ConfigValidation {
                message: format!(
                    "pagination.default_per_page ({}) cannot be greater than pagination.max_per_page ({})",
                    self.pagination.default_per_page, self.pagination.max_per_page
                ),
            });
        }

        Ok(())
    }
}

/// `*`, or a scheme and host usable as an `Origin` header value.
fn valid_origin(origin: &str) -> bool {
    if origin == "*" {
        return true;
    }
    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    matches!(host, Some(host) if !host.is_empty() && !host.contains(['/', ' ']))
        && HeaderValue::from_str(origin).is_ok()
}
