use thiserror::Error;

use super::token::TokenKind;
use super::user::FieldErrors;

/// Failures raised while validating a presented token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Failed to sign token: {message}")]
    Signing { message: String },
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {0}")]
    FieldValidation(FieldErrors),

    #[error("Username '{username}' already exists")]
    UsernameExists { username: String },

    #[error("Phone '{phone}' already exists")]
    PhoneExists { phone: String },

    #[error("Wrong credentials")]
    CredentialMismatch,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Malformed password hash: {message}")]
    HashFormat { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Dependency failure: {message}")]
    Dependency { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn username_exists(username: impl Into<String>) -> Self {
        Self::UsernameExists {
            username: username.into(),
        }
    }

    pub fn phone_exists(phone: impl Into<String>) -> Self {
        Self::PhoneExists {
            phone: phone.into(),
        }
    }

    pub fn hash_format(message: impl Into<String>) -> Self {
        Self::HashFormat {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
        }
    }

    /// Returns the token failure carried by this error, if any
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            Self::Token(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{FieldError, ValidationTag};

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("User '7' not found");
        assert_eq!(error.to_string(), "Not found: User '7' not found");
    }

    #[test]
    fn test_conflict_errors_name_the_value() {
        assert_eq!(
            DomainError::username_exists("alice").to_string(),
            "Username 'alice' already exists"
        );
        assert_eq!(
            DomainError::phone_exists("+15551234567").to_string(),
            "Phone '+15551234567' already exists"
        );
    }

    #[test]
    fn test_field_validation_lists_fields() {
        let errors = FieldErrors::from(vec![
            FieldError::new("username", ValidationTag::Required),
            FieldError::new("phone", ValidationTag::E164),
        ]);
        let error = DomainError::FieldValidation(errors);

        assert_eq!(
            error.to_string(),
            "Validation error: username: required, phone: e164"
        );
    }

    #[test]
    fn test_token_error_conversion() {
        let error: DomainError = TokenError::Expired.into();

        assert_eq!(error.as_token_error(), Some(&TokenError::Expired));
        assert_eq!(error.to_string(), "Token has expired");
    }

    #[test]
    fn test_wrong_kind_message() {
        let error = TokenError::WrongKind {
            expected: TokenKind::Refresh,
            actual: TokenKind::Access,
        };

        assert_eq!(
            error.to_string(),
            "Wrong token kind: expected refresh, got access"
        );
    }
}
