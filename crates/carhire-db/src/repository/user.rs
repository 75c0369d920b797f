//! # User Repository
//!
//! Accounts and the lookups login and registration need.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::DbResult;
use carhire_core::{Role, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by username (exact match).
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Whether a username is already registered.
    pub async fn username_exists(&self, username: &str) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Whether an email is already registered.
    pub async fn email_exists(&self, email: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Inserts a user with an already-hashed password.
    ///
    /// ## Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DbError::UniqueViolation)` - Username or email raced in first
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> DbResult<User> {
        let user = User {
            id: generate_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            date_joined: Utc::now(),
        };

        debug!(id = %user.id, username = %user.username, role = %role, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, date_joined)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Counts registered users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{memory_db, user};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;

        let by_id = db.users().get_by_id(&alice.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.role, Role::Customer);

        let by_name = db.users().get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, alice.id);
        assert!(db.users().get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let db = memory_db().await;
        user(&db, "alice").await;

        assert!(db.users().username_exists("alice").await.unwrap());
        assert!(!db.users().username_exists("Alice2").await.unwrap());
        assert!(db.users().email_exists("alice@example.com").await.unwrap());
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_unique_violation() {
        let db = memory_db().await;
        user(&db, "alice").await;

        let err = db
            .users()
            .insert("alice", "other@example.com", "hash", Role::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(err.duplicate_column(), Some("username"));
    }
}
