use persistence::client::RecordApiConfig;
use serde::Deserialize;
use shared::pagination::{is_valid_page_size, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub record_api: RecordApiSettings,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Record API connection settings.
///
/// Credentials may be left empty: the server still starts, but every record
/// call fails until they are set.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordApiSettings {
    pub base_url: String,

    #[serde(default)]
    pub project_id: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default = "default_record_timeout_ms")]
    pub timeout_ms: u64,
}

impl RecordApiSettings {
    pub fn client_config(&self) -> RecordApiConfig {
        RecordApiConfig {
            base_url: self.base_url.clone(),
            project_id: self.project_id.clone(),
            public_key: self.public_key.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Adds `Strict-Transport-Security`; enable only behind TLS termination.
    #[serde(default)]
    pub hsts_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_record_timeout_ms() -> u64 {
    15_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml
    /// 2. config/local.toml (optional, not in git)
    /// 3. Environment variables with the SH__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SH").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build a configuration from embedded defaults plus `overrides`,
    /// without touching the file system. Not validated.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [record_api]
            base_url = "http://localhost:9090/api"
            project_id = ""
            public_key = ""
            timeout_ms = 5000

            [logging]
            level = "debug"
            format = "pretty"

            [security]
            cors_origins = []
            hsts_enabled = false

            [pagination]
            default_per_page = 20
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        self.socket_addr()?;

        if self.record_api.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SH__RECORD_API__BASE_URL must be set".to_string(),
            ));
        }

        if !is_valid_page_size(self.pagination.default_per_page) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "pagination.default_per_page must be one of {:?}",
                PAGE_SIZE_OPTIONS
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.record_api.timeout_ms, 5000);
        assert_eq!(config.pagination.default_per_page, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::load_for_test(&[
            ("server.port", "9000"),
            ("logging.level", "warn"),
            ("record_api.project_id", "proj_123"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.record_api.client_config().project_id, "proj_123");
    }

    #[test]
    fn test_config_validation_missing_base_url() {
        let config =
            Config::load_for_test(&[("record_api.base_url", "")]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("SH__RECORD_API__BASE_URL"));
    }

    #[test]
    fn test_config_validation_rejects_odd_page_size() {
        let config = Config::load_for_test(&[("pagination.default_per_page", "25")])
            .expect("Failed to load config");
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("default_per_page"));
    }

    #[test]
    fn test_config_validation_port_zero() {
        let config = Config::load_for_test(&[("server.port", "0")]).expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_are_allowed() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        assert!(!config.record_api.client_config().has_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[("server.host", "127.0.0.1"), ("server.port", "3000")])
            .expect("Failed to load config");

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
