//! Domain layer - Core business rules and entities

pub mod error;
pub mod token;
pub mod user;

pub use error::{DomainError, TokenError};
pub use token::{TokenClaims, TokenKind, TokenPair, TokenSubject};
pub use user::{
    check_uniqueness, validate_changed_fields, validate_fields, FieldErrors, NewUser, User,
    UserChanges, UserId, UserRecord, UserRepository,
};
