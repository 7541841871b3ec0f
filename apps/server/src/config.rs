//! Server configuration
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. optional config file (`config.toml`, or the path in `STRATA_CONFIG_FILE`)
//! 3. environment variables, e.g. `STRATA__SERVER__PORT=9000`
//!
//! A `.env` file in the working directory is loaded before reading the
//! environment.

use anyhow::Context as _;
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};

pub const ENV_PREFIX: &str = "STRATA";
pub const CONFIG_FILE_ENV: &str = "STRATA_CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "config";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub templates: TemplateConfig,
    pub context: ContextConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for request bodies, also used as the context buffering limit.
    pub max_request_body_size: usize,
    /// Allowed CORS origins. Empty disables CORS headers.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_request_body_size: 2 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub enabled: bool,
    pub glob: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            glob: "templates/**/*.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Pre-fill each request's format from `_format` / `Accept`.
    pub negotiate_format: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            negotiate_format: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub service_name: String,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily, hourly, minutely or never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            service_name: "strata-server".to_string(),
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "strata".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `.env`, the config file and the environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file).with_context(|| format!("Failed to load configuration from {file}"))
    }

    /// Load from a specific file (extension optional) plus the environment.
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.trim().is_empty() {
            return Err("server.host must not be empty".to_string());
        }
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.server.max_request_body_size == 0 {
            return Err("server.max_request_body_size must be greater than 0".to_string());
        }
        if self.templates.enabled && self.templates.glob.trim().is_empty() {
            return Err("templates.glob must be set when templates are enabled".to_string());
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            ));
        }
        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            return Err(format!(
                "logging.file_rotation '{}' is not one of daily, hourly, minutely, never",
                self.logging.file_rotation
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve {}:{}", self.server.host, self.server.port))?
            .next()
            .with_context(|| format!("No address for {}:{}", self.server.host, self.server.port))
    }
}
