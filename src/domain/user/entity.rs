//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a user ID is not a positive integer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("User ID must be a positive integer, got {0}")]
pub struct InvalidUserId(pub i64);

/// Store-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: i64) -> Result<Self, InvalidUserId> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(InvalidUserId(id))
        }
    }

    /// Get the inner integer value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated candidate handed to the store for insertion.
///
/// `password_hash` must already be a digest produced by a password hasher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub is_admin: bool,
    pub is_active: bool,
}

/// Delta applied by an update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Flat view of a persisted row, used by stores to rebuild a [`User`]
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: String,
    pub phone: String,
    pub password_hash: String,
    pub role: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// User entity for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    username: String,
    phone: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    role: String,
    is_admin: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build the stored form of a freshly inserted user
    pub fn new(id: UserId, new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            username: new_user.username,
            phone: new_user.phone,
            password_hash: new_user.password_hash,
            role: new_user.role,
            is_admin: new_user.is_admin,
            is_active: new_user.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Rebuild a user from a persisted row
    pub fn restore(record: UserRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            username: record.username,
            phone: record.phone,
            password_hash: record.password_hash,
            role: record.role,
            is_admin: record.is_admin,
            is_active: record.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Soft-deleted users are kept for audit but excluded from lookups
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // Mutators

    /// Apply an update delta, touching `updated_at` only when something changed
    pub fn apply(&mut self, changes: UserChanges, now: DateTime<Utc>) {
        if changes.is_empty() {
            return;
        }

        if let Some(first_name) = changes.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(phone) = changes.phone {
            self.phone = phone;
        }
        if let Some(password_hash) = changes.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(is_admin) = changes.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }

        self.updated_at = now;
    }

    /// Mark the user as soft-deleted
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
