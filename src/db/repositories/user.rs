//! User repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{ListParams, PagedResult, User, UserRole, UserStatus};

/// Repository trait for user operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    /// Find a user by id
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List users with pagination, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>>;

    /// Total number of users
    async fn count(&self) -> Result<i64>;

    /// Update role and status
    async fn update_role_status(&self, id: i64, role: UserRole, status: UserStatus) -> Result<()>;

    /// Update the stored password hash
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based user repository
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    let status: String = row.get("status");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role)?,
        status: UserStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role, status)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.status.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted user not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user by id")?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user by username")?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query user by email")?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let total = self.count().await?;

        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")?;

        let users = rows
            .iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(users, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }

    async fn update_role_status(&self, id: i64, role: UserRole, status: UserStatus) -> Result<()> {
        sqlx::query(
            "UPDATE users SET role = ?, status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(role.to_string())
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user role/status")?;
        Ok(())
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update password hash")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample_user(name: &str) -> User {
        User::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
            UserRole::Customer,
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::new(pool);

        let created = repo.create(&sample_user("amina")).await.unwrap();
        assert!(created.id > 0);

        let by_name = repo.find_by_username("amina").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.email, "amina@example.com");

        let missing = repo.find_by_username("nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::new(pool);

        repo.create(&sample_user("amina")).await.unwrap();
        assert!(repo.create(&sample_user("amina")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_role_status() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::new(pool);

        let user = repo.create(&sample_user("amina")).await.unwrap();
        repo.update_role_status(user.id, UserRole::Admin, UserStatus::Disabled)
            .await
            .unwrap();

        let updated = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.status, UserStatus::Disabled);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::new(pool);

        for name in ["a1", "a2", "a3"] {
            repo.create(&sample_user(name)).await.unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 3);

        let page = repo.list(&ListParams::new(1, 2)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_next());
    }
}
