//! Website content repository
//!
//! Key-value access to the editable site copy. Writes upsert on the
//! unique key; reads come back ordered so page assembly is stable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{ContentEntry, ContentKind, UpsertContentInput};

/// Repository trait for website content operations
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Get a single entry by key
    async fn get(&self, key: &str) -> Result<Option<ContentEntry>>;

    /// Get all entries for a page, ordered by section then key
    async fn get_page(&self, page: &str) -> Result<Vec<ContentEntry>>;

    /// Get every entry, ordered by page, section, key
    async fn get_all(&self) -> Result<Vec<ContentEntry>>;

    /// Insert or overwrite an entry by key, returning the stored row
    async fn upsert(&self, input: &UpsertContentInput) -> Result<ContentEntry>;

    /// Delete an entry by key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Distinct page names present in the store
    async fn list_pages(&self) -> Result<Vec<String>>;
}

/// SQLx-based content repository
pub struct SqlxContentRepository {
    pool: DbPool,
}

impl SqlxContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ContentRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<ContentEntry> {
    let kind: String = row.get("kind");
    Ok(ContentEntry {
        id: row.get("id"),
        key: row.get("key"),
        title: row.get("title"),
        value: row.get("value"),
        kind: ContentKind::from_str(&kind)?,
        page: row.get("page"),
        section: row.get("section"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl ContentRepository for SqlxContentRepository {
    async fn get(&self, key: &str) -> Result<Option<ContentEntry>> {
        let row = sqlx::query("SELECT * FROM website_content WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query content entry")?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn get_page(&self, page: &str) -> Result<Vec<ContentEntry>> {
        let rows =
            sqlx::query("SELECT * FROM website_content WHERE page = ? ORDER BY section, key")
                .bind(page)
                .fetch_all(&self.pool)
                .await
                .context("Failed to query page content")?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn get_all(&self) -> Result<Vec<ContentEntry>> {
        let rows = sqlx::query("SELECT * FROM website_content ORDER BY page, section, key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to query all content")?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn upsert(&self, input: &UpsertContentInput) -> Result<ContentEntry> {
        sqlx::query(
            "INSERT INTO website_content (key, title, value, kind, page, section)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 title = excluded.title,
                 value = excluded.value,
                 kind = excluded.kind,
                 page = excluded.page,
                 section = excluded.section,
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(&input.key)
        .bind(&input.title)
        .bind(&input.value)
        .bind(input.kind.to_string())
        .bind(&input.page)
        .bind(&input.section)
        .execute(&self.pool)
        .await
        .context("Failed to upsert content entry")?;

        self.get(&input.key)
            .await?
            .context("Upserted content entry not found")
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM website_content WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete content entry")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pages(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT page FROM website_content ORDER BY page")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list content pages")?;
        Ok(rows.into_iter().map(|r| r.get("page")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn input(key: &str, page: &str, section: &str, value: &str) -> UpsertContentInput {
        UpsertContentInput {
            key: key.to_string(),
            title: None,
            value: value.to_string(),
            kind: ContentKind::Text,
            page: page.to_string(),
            section: section.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_overwrites() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxContentRepository::new(pool);

        let created = repo
            .upsert(&input("home_hero_title", "home", "hero", "Sail the Nile"))
            .await
            .unwrap();
        assert_eq!(created.value, "Sail the Nile");

        let updated = repo
            .upsert(&input("home_hero_title", "home", "hero", "Discover Egypt"))
            .await
            .unwrap();
        assert_eq!(updated.value, "Discover Egypt");
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn test_get_page_ordering() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxContentRepository::new(pool);

        repo.upsert(&input("home_b", "home", "hero", "b")).await.unwrap();
        repo.upsert(&input("home_a", "home", "about", "a")).await.unwrap();
        repo.upsert(&input("other", "about", "x", "c")).await.unwrap();

        let entries = repo.get_page("home").await.unwrap();
        assert_eq!(entries.len(), 2);
        // Sections sort ascending, "about" before "hero"
        assert_eq!(entries[0].key, "home_a");
        assert_eq!(entries[1].key, "home_b");
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxContentRepository::new(pool);

        repo.upsert(&input("k", "p", "s", "v")).await.unwrap();
        assert!(repo.delete("k").await.unwrap());
        assert!(!repo.delete("k").await.unwrap());
        assert!(repo.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_includes_seeded_global() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxContentRepository::new(pool);

        repo.upsert(&input("x", "fleet", "s", "v")).await.unwrap();
        let pages = repo.list_pages().await.unwrap();
        assert!(pages.contains(&"global".to_string()));
        assert!(pages.contains(&"fleet".to_string()));
    }
}
