//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{Result, SchoolDeskError};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive such as `info` or `SchoolDesk=debug,sqlx=warn`
    pub level: String,
    pub json: bool,
    /// Directory for the daily rolling log file; stdout only when unset
    pub directory: Option<String>,
}

/// Admin interface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub page_size: usize,
    pub max_page_size: usize,
    /// Superuser created at startup when no account with this username exists
    pub bootstrap_username: Option<String>,
    pub bootstrap_email: Option<String>,
    pub bootstrap_password: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> std::result::Result<Self, config::ConfigError> {
        Self::from_sources(config::File::with_name("config").required(false))
    }

    /// Load settings from an explicit configuration file path
    pub fn from_file(path: &str) -> std::result::Result<Self, config::ConfigError> {
        Self::from_sources(config::File::with_name(path).required(true))
    }

    fn from_sources(
        file: config::File<config::FileSourceFile, config::FileFormat>,
    ) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(config::Environment::with_prefix("SCHOOLDESK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Socket address for the admin HTTP listener
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| SchoolDeskError::Config(format!("Invalid server address: {}", e)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/schooldesk".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
                directory: None,
            },
            admin: AdminConfig {
                page_size: 100,
                max_page_size: 500,
                bootstrap_username: None,
                bootstrap_email: None,
                bootstrap_password: None,
            },
        }
    }
}
