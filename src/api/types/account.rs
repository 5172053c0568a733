//! Account request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::token::TokenPair;
use crate::domain::user::User;
use crate::infrastructure::user::CreateUserRequest;

/// Self-service registration body; role and flags take their defaults
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
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
}

impl From<SignupRequest> for CreateUserRequest {
    fn from(request: SignupRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            ..CreateUserRequest::new(request.username, request.phone, request.password)
        }
    }
}

/// Credentials presented at login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: a fresh token pair plus the authenticated user
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub tokens: TokenPair,
    pub user: User,
}

/// Refresh token exchanged for a new pair; cookie clients may omit it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// List wrapper
#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub object: &'static str,
    pub data: Vec<User>,
}

impl UsersResponse {
    pub fn new(data: Vec<User>) -> Self {
        Self {
            object: "list",
            data,
        }
    }
}
