//! Notification repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{ListParams, Notification, PagedResult};

/// Repository trait for back-office notifications
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Record a notification
    async fn create(&self, kind: &str, title: &str, body: &str) -> Result<Notification>;

    /// List notifications, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<Notification>>;

    /// Number of unread notifications
    async fn count_unread(&self) -> Result<i64>;

    /// Mark one notification as read
    async fn mark_read(&self, id: i64) -> Result<()>;

    /// Mark every notification as read
    async fn mark_all_read(&self) -> Result<u64>;
}

/// SQLx-based notification repository
pub struct SqlxNotificationRepository {
    pool: DbPool,
}

impl SqlxNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_notification(row: &SqliteRow) -> Notification {
    let read: i64 = row.get("read");
    Notification {
        id: row.get("id"),
        kind: row.get("kind"),
        title: row.get("title"),
        body: row.get("body"),
        read: read != 0,
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, kind: &str, title: &str, body: &str) -> Result<Notification> {
        let result =
            sqlx::query("INSERT INTO notifications (kind, title, body) VALUES (?, ?, ?)")
                .bind(kind)
                .bind(title)
                .bind(body)
                .execute(&self.pool)
                .await
                .context("Failed to insert notification")?;

        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await
            .context("Inserted notification not found")?;
        Ok(row_to_notification(&row))
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<Notification>> {
        let count_row = sqlx::query("SELECT COUNT(*) as count FROM notifications")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count notifications")?;
        let total: i64 = count_row.get("count");

        let rows =
            sqlx::query("SELECT * FROM notifications ORDER BY created_at DESC LIMIT ? OFFSET ?")
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list notifications")?;

        let items = rows.iter().map(row_to_notification).collect();
        Ok(PagedResult::new(items, total, params))
    }

    async fn count_unread(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM notifications WHERE read = 0")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count unread notifications")?;
        Ok(row.get("count"))
    }

    async fn mark_read(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to mark notification read")?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(&self.pool)
            .await
            .context("Failed to mark notifications read")?;
        Ok(result.rows_affected())
    }
}
