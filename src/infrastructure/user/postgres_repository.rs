//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::user::{NewUser, User, UserChanges, UserId, UserRecord, UserRepository};
use crate::domain::DomainError;

/// Partial unique index on active usernames
pub const USERNAME_INDEX: &str = "users_username_active_key";
/// Partial unique index on active phone numbers
pub const PHONE_INDEX: &str = "users_phone_active_key";

const USER_COLUMNS: &str = "id, first_name, last_name, username, phone, password_hash, role, \
                            is_admin, is_active, created_at, updated_at, deleted_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        filter: &str,
        value: &str,
        context: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = $1 AND deleted_at IS NULL",
            USER_COLUMNS, filter
        );

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(context, e))?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, username, phone, password_hash, role,
                               is_admin, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.is_admin)
            .bind(user.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(&e, &user.username, &user.phone)
                    .unwrap_or_else(|| storage_error("Failed to create user", e))
            })?;

        row_to_user(&row)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL ORDER BY id",
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list users", e))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get user", e))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_one("username", username, "Failed to get user by username")
            .await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        self.find_one("phone", phone, "Failed to get user by phone")
            .await
    }

    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DomainError> {
        if changes.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)));
        }

        let sql = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                username = COALESCE($4, username),
                phone = COALESCE($5, phone),
                password_hash = COALESCE($6, password_hash),
                role = COALESCE($7, role),
                is_admin = COALESCE($8, is_admin),
                is_active = COALESCE($9, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let username = changes.username.clone().unwrap_or_default();
        let phone = changes.phone.clone().unwrap_or_default();

        let row = sqlx::query(&sql)
            .bind(id.value())
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.username)
            .bind(changes.phone)
            .bind(changes.password_hash)
            .bind(changes.role)
            .bind(changes.is_admin)
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(&e, &username, &phone)
                    .unwrap_or_else(|| storage_error("Failed to update user", e))
            })?;

        match row {
            Some(row) => row_to_user(&row),
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn soft_delete(&self, id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }
}

fn storage_error(context: &str, error: sqlx::Error) -> DomainError {
    DomainError::dependency(format!("{}: {}", context, error))
}

fn map_unique_violation(error: &sqlx::Error, username: &str, phone: &str) -> Option<DomainError> {
    let db_error = error.as_database_error()?;

    if !db_error.is_unique_violation() {
        return None;
    }

    conflict_for_constraint(db_error.constraint()?, username, phone)
}

/// Translate a violated unique index into the matching conflict
fn conflict_for_constraint(constraint: &str, username: &str, phone: &str) -> Option<DomainError> {
    match constraint {
        USERNAME_INDEX => Some(DomainError::username_exists(username)),
        PHONE_INDEX => Some(DomainError::phone_exists(phone)),
        _ => None,
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, DomainError> {
    let decode = |e: sqlx::Error| storage_error("Failed to decode user row", e);

    let raw_id: i64 = row.try_get("id").map_err(decode)?;
    let id = UserId::new(raw_id)
        .map_err(|e| DomainError::dependency(format!("Invalid user ID in database: {}", e)))?;

    Ok(User::restore(UserRecord {
        id,
        first_name: row.try_get("first_name").map_err(decode)?,
        last_name: row.try_get("last_name").map_err(decode)?,
        username: row.try_get("username").map_err(decode)?,
        phone: row.try_get("phone").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        role: row.try_get("role").map_err(decode)?,
        is_admin: row.try_get("is_admin").map_err(decode)?,
        is_active: row.try_get("is_active").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
        deleted_at: row.try_get("deleted_at").map_err(decode)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_index_maps_to_username_conflict() {
        let error = conflict_for_constraint(USERNAME_INDEX, "alice", "+15551234567");
        assert!(matches!(
            error,
            Some(DomainError::UsernameExists { ref username }) if username == "alice"
        ));
    }

    #[test]
    fn test_phone_index_maps_to_phone_conflict() {
        let error = conflict_for_constraint(PHONE_INDEX, "alice", "+15551234567");
        assert!(matches!(
            error,
            Some(DomainError::PhoneExists { ref phone }) if phone == "+15551234567"
        ));
    }

    #[test]
    fn test_unknown_constraint_is_not_a_conflict() {
        assert!(conflict_for_constraint("users_pkey", "alice", "+1").is_none());
    }

    #[test]
    fn test_non_database_error_is_not_a_conflict() {
        let error = sqlx::Error::RowNotFound;
        assert!(map_unique_violation(&error, "alice", "+1").is_none());
    }

    #[test]
    fn test_storage_error_is_dependency_failure() {
        let error = storage_error("Failed to get user", sqlx::Error::PoolTimedOut);
        assert!(matches!(error, DomainError::Dependency { .. }));
        assert!(error.to_string().contains("Failed to get user"));
    }

    #[test]
    fn test_migration_defines_conflict_indexes() {
        let sql: String = crate::infrastructure::storage::storage_migrations()
            .into_iter()
            .map(|m| m.up)
            .collect();

        assert!(sql.contains(USERNAME_INDEX));
        assert!(sql.contains(PHONE_INDEX));
    }
}
