//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserChanges, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug)]
struct UserTable {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

impl UserTable {
    fn active(&self) -> impl Iterator<Item = &User> {
        self.users.values().filter(|u| !u.is_deleted())
    }

    /// Enforce username/phone uniqueness among active users, ignoring `own_id`
    fn check_constraints(
        &self,
        username: &str,
        phone: &str,
        own_id: Option<UserId>,
    ) -> Result<(), DomainError> {
        let others = || self.active().filter(move |u| Some(u.id()) != own_id);

        if others().any(|u| u.username() == username) {
            return Err(DomainError::username_exists(username));
        }

        if others().any(|u| u.phone() == phone) {
            return Err(DomainError::phone_exists(phone));
        }

        Ok(())
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(UserTable {
                users: BTreeMap::new(),
                last_id: 0,
            })),
        }
    }

    /// Number of stored records, including soft-deleted ones
    pub async fn stored_count(&self) -> usize {
        self.table.read().await.users.len()
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn user_not_found(id: UserId) -> DomainError {
    DomainError::not_found(format!("User '{}' not found", id))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        table.check_constraints(&user.username, &user.phone, None)?;

        let id = UserId::new(table.last_id + 1)
            .map_err(|e| DomainError::dependency(format!("ID sequence exhausted: {}", e)))?;
        let created = User::new(id, user, Utc::now());

        table.last_id = id.value();
        table.users.insert(id, created.clone());

        Ok(created)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.active().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.active().find(|u| u.id() == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.active().find(|u| u.username() == username).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.active().find(|u| u.phone() == phone).cloned())
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let current = table
            .active()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or_else(|| user_not_found(id))?;

        let username = changes.username.as_deref().unwrap_or(current.username());
        let phone = changes.phone.as_deref().unwrap_or(current.phone());
        table.check_constraints(username, phone, Some(id))?;

        let mut updated = current;
        updated.apply(changes, Utc::now());
        table.users.insert(id, updated.clone());

        Ok(updated)
    }

    async fn soft_delete(&self, id: UserId) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        match table.users.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.mark_deleted(Utc::now());
                Ok(())
            }
            _ => Err(user_not_found(id)),
        }
    }
}
