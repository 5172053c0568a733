//! User repository trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserChanges, UserId};
use crate::domain::DomainError;

/// Durable storage of user records.
///
/// Every lookup excludes soft-deleted users. Implementations should back
/// username and phone uniqueness among active users with a real constraint;
/// the service-level pre-check only gives early, field-specific errors.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, assigning its ID and timestamps
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// List all active users
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Get a user by their ID
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by their phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError>;

    /// Apply a delta to an existing user
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError>;

    /// Mark a user as deleted, keeping the record
    async fn soft_delete(&self, id: UserId) -> Result<(), DomainError>;
}
