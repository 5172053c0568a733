//! User infrastructure module
//!
//! This module provides implementations for user credentials, including
//! password hashing with Argon2, in-memory and Postgres repositories, and the
//! credential service.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, HashCost, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, CredentialService, UpdateUserRequest};

#[cfg(test)]
pub(crate) use password::test_hasher;
