//! Credential service: account lifecycle, login and token exchange

use serde::Deserialize;
use std::sync::Arc;

use crate::domain::token::{TokenClaims, TokenKind, TokenPair};
use crate::domain::user::{
    check_uniqueness, validate_changed_fields, validate_fields, Field, FieldSource, NewUser,
    User, UserChanges, UserId, UserRepository,
};
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenIssuer;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateUserRequest {
    /// Minimal signup request with default role and flags
    pub fn new(
        username: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: None,
            last_name: None,
            username: username.into(),
            phone: phone.into(),
            password: password.into(),
            role: String::new(),
            is_admin: false,
            is_active: true,
        }
    }
}

impl FieldSource for CreateUserRequest {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Username => Some(&self.username),
            Field::Phone => Some(&self.phone),
            Field::Password => Some(&self.password),
        }
    }
}

/// Request for updating a user. Empty strings mean "not changing".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FieldSource for UpdateUserRequest {
    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Username => non_empty(&self.username),
            Field::Phone => non_empty(&self.phone),
            Field::Password => non_empty(&self.password),
        }
    }
}

/// Orchestrates the credential store, the password hasher and the token issuer
#[derive(Debug)]
pub struct CredentialService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<dyn TokenIssuer>,
}

impl<R: UserRepository, H: PasswordHasher> CredentialService<R, H> {
    /// Create a new credential service
    pub fn new(repository: Arc<R>, hasher: Arc<H>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Register a new user.
    ///
    /// Fields are validated and uniqueness is checked before the password is
    /// hashed, so a rejected request never reaches the store.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate_fields(&request).map_err(DomainError::FieldValidation)?;

        check_uniqueness(
            self.repository.as_ref(),
            Some(request.username.as_str()),
            Some(request.phone.as_str()),
            None,
        )
        .await?;

        let password_hash = self.hasher.hash(&request.password)?;

        self.repository
            .create(NewUser {
                first_name: request.first_name,
                last_name: request.last_name,
                username: request.username,
                phone: request.phone,
                password_hash,
                role: request.role,
                is_admin: request.is_admin,
                is_active: request.is_active,
            })
            .await
    }

    /// Apply a partial update and return the user as currently stored
    pub async fn update(&self, id: UserId, request: UpdateUserRequest) -> Result<User, DomainError> {
        validate_changed_fields(&request).map_err(DomainError::FieldValidation)?;

        check_uniqueness(
            self.repository.as_ref(),
            request.field(Field::Username),
            request.field(Field::Phone),
            Some(id),
        )
        .await?;

        let password_hash = match request.field(Field::Password) {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let changes = UserChanges {
            first_name: non_empty(&request.first_name).map(str::to_string),
            last_name: non_empty(&request.last_name).map(str::to_string),
            username: request.field(Field::Username).map(str::to_string),
            phone: request.field(Field::Phone).map(str::to_string),
            password_hash,
            role: non_empty(&request.role).map(str::to_string),
            is_admin: request.is_admin,
            is_active: request.is_active,
        };

        self.repository.update(id, changes).await?;

        self.get(id).await
    }

    /// Soft-delete a user
    pub async fn delete(&self, id: UserId) -> Result<(), DomainError> {
        self.repository.soft_delete(id).await
    }

    /// Authenticate a user with username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self.get_by_username(username).await?;

        self.hasher
            .verify(password, user.password_hash())
            .map_err(|e| match e {
                DomainError::HashFormat { .. } => DomainError::CredentialMismatch,
                other => other,
            })?;

        if !user.is_active() {
            return Err(DomainError::InactiveAccount);
        }

        Ok(user)
    }

    /// Mint an access/refresh pair for an authenticated user
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, DomainError> {
        self.tokens.issue_pair(user)
    }

    /// Verify and decode a token of either kind
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        self.tokens.validate(token)
    }

    /// Exchange a refresh token for a new pair minted from the current user state.
    ///
    /// Deleted users are reported as not found and deactivated users are
    /// rejected, so role and status changes take effect at the next refresh.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let claims = self.tokens.validate_kind(refresh_token, TokenKind::Refresh)?;
        let user = self.get(claims.user_id()?).await?;

        if !user.is_active() {
            return Err(DomainError::InactiveAccount);
        }

        self.tokens.issue_pair(&user)
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", username)))
    }

    /// Get a user by phone number
    pub async fn get_by_phone(&self, phone: &str) -> Result<User, DomainError> {
        self.repository
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("User with phone '{}' not found", phone))
            })
    }

    /// List all active users
    pub async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        self.repository.find_all().await
    }
}
