//! IDM Configuration System
//!
//! TOML-based configuration with environment variable overrides.
//! Every section has defaults, so an empty file (or no file) is a valid config.

use idm_common::TenantDomain;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub api: ApiConfig,
    pub tenant: TenantConfig,
    pub logging: LoggingConfig,

    /// Seed a sample application and identity provider on startup
    pub dev_mode: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix for all management endpoints
    pub base_path: String,
    /// Serve Swagger UI and the OpenAPI document
    pub swagger_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/api/server/v1".to_string(),
            swagger_enabled: true,
        }
    }
}

/// Tenant resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantConfig {
    /// Tenant used when a request carries no tenant header
    pub default_domain: String,
    /// Request header naming the tenant
    pub header: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            default_domain: idm_common::DEFAULT_TENANT_DOMAIN.to_string(),
            header: "X-Tenant-Domain".to_string(),
        }
    }
}

impl TenantConfig {
    pub fn default_tenant(&self) -> Result<TenantDomain, ConfigError> {
        TenantDomain::parse(&self.default_domain).map_err(|e| {
            ConfigError::ValidationError(format!("tenant.default_domain: {}", e))
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "text" or "json"
    pub format: String,
    /// Level used when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn log_format(&self) -> idm_common::LogFormat {
        idm_common::LogFormat::parse(&self.format)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject settings the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError(
                "http.port must be greater than 0".to_string(),
            ));
        }

        let base = &self.api.base_path;
        if !base.starts_with('/') || (base.len() > 1 && base.ends_with('/')) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_path '{}' must start with '/' and must not end with '/'",
                base
            )));
        }

        self.tenant.default_tenant()?;

        if self.tenant.header.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tenant.header cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# IDM Configuration
# Environment variables override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[api]
base_path = "/api/server/v1"
swagger_enabled = true

[tenant]
default_domain = "default"
header = "X-Tenant-Domain"

[logging]
format = "text"  # text or json
level = "info"   # RUST_LOG takes precedence
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.api.base_path, "/api/server/v1");
        assert_eq!(config.tenant.header, "X-Tenant-Domain");
        assert!(!config.dev_mode);
        config.validate().unwrap();
    }

    #[test]
    fn test_example_toml_parses() {
        let config = AppConfig::from_toml(&AppConfig::example_toml()).unwrap();
        config.validate().unwrap();
        assert!(config.api.swagger_enabled);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 9443\n\n[logging]\nformat = \"json\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.http.port, 9443);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.logging.log_format(), idm_common::LogFormat::Json);
        assert_eq!(config.tenant.default_domain, "default");
    }

    #[test]
    fn test_malformed_toml() {
        let result = AppConfig::from_toml("[http\nport = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = AppConfig::default();
        config.http.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.base_path = "api/v1".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.base_path = "/api/v1/".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tenant.default_domain = "not a domain".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.tenant.header = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
