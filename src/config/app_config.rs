use serde::Deserialize;

use crate::infrastructure::user::HashCost;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret; falls back to `JWT_SECRET`, then to a random value
    pub jwt_secret: Option<String>,
    pub access_token_minutes: u64,
    pub refresh_token_minutes: u64,
    /// Mark token cookies `Secure` (HTTPS only)
    pub cookie_secure: bool,
    pub hash: HashCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Metrics endpoint path
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            access_token_minutes: 15,
            refresh_token_minutes: 7 * 24 * 60,
            cookie_secure: false,
            hash: HashCost::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config/default").required(false))
                .add_source(config::File::with_name("config/local").required(false)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> AppConfig {
        AppConfig::from_builder(
            config::Config::builder()
                .add_source(config::File::from_str(json, config::FileFormat::Json)),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.auth.access_token_minutes, 15);
        assert_eq!(config.auth.refresh_token_minutes, 10080);
        assert!(config.auth.jwt_secret.is_none());
        assert!(!config.auth.cookie_secure);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = from_json("{}");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.hash, HashCost::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = from_json(
            r#"{
                "server": { "port": 9000 },
                "logging": { "format": "json" },
                "auth": {
                    "jwt_secret": "file-secret",
                    "access_token_minutes": 5,
                    "cookie_secure": true,
                    "hash": { "memory_kib": 4096, "iterations": 2, "parallelism": 1 }
                },
                "storage": { "backend": "postgres", "database_url": "postgres://db/users" }
            }"#,
        );

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("file-secret"));
        assert_eq!(config.auth.access_token_minutes, 5);
        assert_eq!(config.auth.refresh_token_minutes, 10080);
        assert!(config.auth.cookie_secure);
        assert_eq!(config.auth.hash.memory_kib, 4096);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://db/users")
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = AppConfig::from_builder(config::Config::builder().add_source(
            config::File::from_str(r#"{"storage": {"backend": "sqlite"}}"#, config::FileFormat::Json),
        ));

        assert!(result.is_err());
    }
}
