//! Credential Gateway
//!
//! Account credentials and token lifecycle:
//! - Argon2 password hashing and verification
//! - Field validation and username/phone uniqueness
//! - HS256 access/refresh token pairs with refresh exchange
//! - In-memory or PostgreSQL credential storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::auth::cookies::TokenCookieSettings;
use api::state::{AppState, CredentialServiceTrait};
use config::{AuthConfig, StorageBackend, StorageConfig};
use infrastructure::{
    auth::{JwtConfig, JwtService, TokenIssuer},
    storage::{self, PostgresConfig},
    user::{Argon2Hasher, CredentialService, InMemoryUserRepository, PostgresUserRepository},
};
use rand::Rng;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let hasher = Arc::new(Argon2Hasher::with_cost(config.auth.hash)?);
    let tokens = create_token_issuer(&config.auth);

    info!("Storage backend: {:?}", config.storage.backend);

    let credential_service: Arc<dyn CredentialServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(CredentialService::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher,
            tokens,
        )),
        StorageBackend::Postgres => {
            let pool = connect_postgres(&config.storage).await?;
            let applied = storage::run_storage_migrations(&pool).await?;
            info!(applied, "Storage migrations up to date");

            Arc::new(CredentialService::new(
                Arc::new(PostgresUserRepository::new(pool)),
                hasher,
                tokens,
            ))
        }
    };

    Ok(AppState::new(credential_service)
        .with_token_cookies(TokenCookieSettings::from_config(&config.auth)))
}

/// Connect to PostgreSQL using `storage.database_url` or `DATABASE_URL`
pub async fn connect_postgres(config: &StorageConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url = config
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
        })?;

    info!("Connecting to PostgreSQL...");
    let pool = storage::connect(
        &PostgresConfig::new(database_url).with_max_connections(config.max_connections),
    )
    .await?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

fn create_token_issuer(config: &AuthConfig) -> Arc<dyn TokenIssuer> {
    let secret = resolve_jwt_secret(config.jwt_secret.clone(), std::env::var("JWT_SECRET").ok());

    Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.access_token_minutes,
        config.refresh_token_minutes,
    )))
}

/// Configured secret first, then the environment, then a random one
fn resolve_jwt_secret(configured: Option<String>, from_env: Option<String>) -> String {
    configured
        .filter(|s| !s.is_empty())
        .or_else(|| from_env.filter(|s| !s.is_empty()))
        .unwrap_or_else(|| {
            tracing::warn!(
                "No auth.jwt_secret or JWT_SECRET configured. Generating random secret. \
                Tokens will NOT survive a restart."
            );
            generate_random_secret()
        })
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
