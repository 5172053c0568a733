//! User domain
//!
//! This module provides domain types and traits for user credentials,
//! including user entities, field validation, uniqueness rules, and the
//! repository trait.

mod entity;
mod repository;
mod uniqueness;
mod validation;

pub use entity::{InvalidUserId, NewUser, User, UserChanges, UserId, UserRecord};
pub use repository::UserRepository;
pub use uniqueness::check_uniqueness;
pub use validation::{
    is_e164, validate_changed_fields, validate_fields, Field, FieldError, FieldErrors,
    FieldSource, ValidationTag,
};

#[cfg(test)]
pub use repository::MockUserRepository;
