//! Contact message repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{ContactMessage, CreateContactInput, ListParams, PagedResult};

/// Repository trait for contact message operations
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ContactMessage>>;

    /// List messages, newest first, optionally unread only
    async fn list(
        &self,
        params: &ListParams,
        unread_only: bool,
    ) -> Result<PagedResult<ContactMessage>>;

    /// Number of unread messages
    async fn count_unread(&self) -> Result<i64>;

    /// Mark a message read or unread
    async fn set_read(&self, id: i64, read: bool) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based contact repository
pub struct SqlxContactRepository {
    pool: DbPool,
}

impl SqlxContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_message(row: &SqliteRow) -> ContactMessage {
    let read: i64 = row.get("read");
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        subject: row.get("subject"),
        message: row.get("message"),
        read: read != 0,
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactMessage> {
        let result = sqlx::query(
            "INSERT INTO contact_messages (name, email, phone, subject, message)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.subject)
        .bind(&input.message)
        .execute(&self.pool)
        .await
        .context("Failed to insert contact message")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted contact message not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ContactMessage>> {
        let row = sqlx::query("SELECT * FROM contact_messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query contact message")?;
        Ok(row.as_ref().map(row_to_message))
    }

    async fn list(
        &self,
        params: &ListParams,
        unread_only: bool,
    ) -> Result<PagedResult<ContactMessage>> {
        let filter = if unread_only { "WHERE read = 0" } else { "" };

        let count_row = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM contact_messages {}",
            filter
        ))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count contact messages")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(&format!(
            "SELECT * FROM contact_messages {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            filter
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contact messages")?;

        let items = rows.iter().map(row_to_message).collect();
        Ok(PagedResult::new(items, total, params))
    }

    async fn count_unread(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM contact_messages WHERE read = 0")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count unread messages")?;
        Ok(row.get("count"))
    }

    async fn set_read(&self, id: i64, read: bool) -> Result<()> {
        sqlx::query("UPDATE contact_messages SET read = ? WHERE id = ?")
            .bind(read as i64)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update message read flag")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete contact message")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample() -> CreateContactInput {
        CreateContactInput {
            name: "Visitor".to_string(),
            email: "visitor@example.com".to_string(),
            phone: None,
            subject: "Availability".to_string(),
            message: "Do you have October departures?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_messages_start_unread() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxContactRepository::new(pool);

        let message = repo.create(&sample()).await.unwrap();
        assert!(!message.read);
        assert_eq!(repo.count_unread().await.unwrap(), 1);

        repo.set_read(message.id, true).await.unwrap();
        assert_eq!(repo.count_unread().await.unwrap(), 0);

        let unread = repo.list(&ListParams::default(), true).await.unwrap();
        assert_eq!(unread.total, 0);
    }
}
