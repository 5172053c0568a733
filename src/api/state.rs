//! Application state for shared services

use std::sync::Arc;

use crate::api::auth::cookies::TokenCookieSettings;
use crate::domain::token::{TokenClaims, TokenPair};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::{
    CreateUserRequest, CredentialService, PasswordHasher, UpdateUserRequest,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub credential_service: Arc<dyn CredentialServiceTrait>,
    pub token_cookies: TokenCookieSettings,
}

impl AppState {
    pub fn new(credential_service: Arc<dyn CredentialServiceTrait>) -> Self {
        Self {
            credential_service,
            token_cookies: TokenCookieSettings::default(),
        }
    }

    pub fn with_token_cookies(mut self, token_cookies: TokenCookieSettings) -> Self {
        self.token_cookies = token_cookies;
        self
    }
}

/// Trait for credential service operations
#[async_trait::async_trait]
pub trait CredentialServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<User, DomainError>;
    async fn delete(&self, id: UserId) -> Result<(), DomainError>;
    async fn login(&self, username: &str, password: &str) -> Result<User, DomainError>;
    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError>;
    fn validate_token(&self, token: &str) -> Result<TokenClaims, DomainError>;
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, DomainError>;
    async fn get(&self, id: UserId) -> Result<User, DomainError>;
    async fn get_by_username(&self, username: &str) -> Result<User, DomainError>;
    async fn get_by_phone(&self, phone: &str) -> Result<User, DomainError>;
    async fn list_all(&self) -> Result<Vec<User>, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> CredentialServiceTrait for CredentialService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        CredentialService::create(self, request).await
    }

    async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<User, DomainError> {
        CredentialService::update(self, id, request).await
    }

    async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        CredentialService::delete(self, id).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<User, DomainError> {
        CredentialService::login(self, username, password).await
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        CredentialService::issue_tokens(self, user)
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        CredentialService::validate_token(self, token)
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        CredentialService::refresh_tokens(self, refresh_token).await
    }

    async fn get(&self, id: UserId) -> Result<User, DomainError> {
        CredentialService::get(self, id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        CredentialService::get_by_username(self, username).await
    }

    async fn get_by_phone(&self, phone: &str) -> Result<User, DomainError> {
        CredentialService::get_by_phone(self, phone).await
    }

    async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        CredentialService::list_all(self).await
    }
}
