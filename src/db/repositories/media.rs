//! Media asset repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{ListParams, MediaAsset, MediaKind, PagedResult};

/// Repository trait for media library operations
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, asset: &MediaAsset) -> Result<MediaAsset>;
    async fn find_by_id(&self, id: i64) -> Result<Option<MediaAsset>>;

    /// List assets, newest first, optionally filtered by kind
    async fn list(
        &self,
        params: &ListParams,
        kind: Option<MediaKind>,
    ) -> Result<PagedResult<MediaAsset>>;

    /// Update the alt text
    async fn set_alt(&self, id: i64, alt: Option<&str>) -> Result<()>;

    /// Delete the database row, returning the asset for file cleanup
    async fn delete(&self, id: i64) -> Result<Option<MediaAsset>>;
}

/// SQLx-based media repository
pub struct SqlxMediaRepository {
    pool: DbPool,
}

impl SqlxMediaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn MediaRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_asset(row: &SqliteRow) -> Result<MediaAsset> {
    let kind: String = row.get("kind");
    Ok(MediaAsset {
        id: row.get("id"),
        filename: row.get("filename"),
        url: row.get("url"),
        kind: MediaKind::from_str(&kind)?,
        content_type: row.get("content_type"),
        size: row.get("size"),
        alt: row.get("alt"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl MediaRepository for SqlxMediaRepository {
    async fn create(&self, asset: &MediaAsset) -> Result<MediaAsset> {
        let result = sqlx::query(
            "INSERT INTO media_assets (filename, url, kind, content_type, size, alt)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&asset.filename)
        .bind(&asset.url)
        .bind(asset.kind.to_string())
        .bind(&asset.content_type)
        .bind(asset.size)
        .bind(&asset.alt)
        .execute(&self.pool)
        .await
        .context("Failed to insert media asset")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted media asset not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MediaAsset>> {
        let row = sqlx::query("SELECT * FROM media_assets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query media asset")?;
        row.as_ref().map(row_to_asset).transpose()
    }

    async fn list(
        &self,
        params: &ListParams,
        kind: Option<MediaKind>,
    ) -> Result<PagedResult<MediaAsset>> {
        let (total, rows) = match kind {
            Some(kind) => {
                let count_row =
                    sqlx::query("SELECT COUNT(*) as count FROM media_assets WHERE kind = ?")
                        .bind(kind.to_string())
                        .fetch_one(&self.pool)
                        .await
                        .context("Failed to count media assets")?;
                let total: i64 = count_row.get("count");
                let rows = sqlx::query(
                    "SELECT * FROM media_assets WHERE kind = ?
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(kind.to_string())
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list media assets")?;
                (total, rows)
            }
            None => {
                let count_row = sqlx::query("SELECT COUNT(*) as count FROM media_assets")
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count media assets")?;
                let total: i64 = count_row.get("count");
                let rows = sqlx::query(
                    "SELECT * FROM media_assets ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list media assets")?;
                (total, rows)
            }
        };

        let items = rows.iter().map(row_to_asset).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn set_alt(&self, id: i64, alt: Option<&str>) -> Result<()> {
        sqlx::query(
            "UPDATE media_assets SET alt = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(alt)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update media alt text")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<Option<MediaAsset>> {
        let asset = self.find_by_id(id).await?;
        if asset.is_some() {
            sqlx::query("DELETE FROM media_assets WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await
                .context("Failed to delete media asset")?;
        }
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use chrono::Utc;

    fn sample(filename: &str, content_type: &str) -> MediaAsset {
        let now = Utc::now();
        MediaAsset {
            id: 0,
            filename: filename.to_string(),
            url: format!("/uploads/{}", filename),
            kind: MediaKind::from_content_type(content_type),
            content_type: content_type.to_string(),
            size: 1024,
            alt: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_kind_filtering() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxMediaRepository::new(pool);

        repo.create(&sample("deck.jpg", "image/jpeg")).await.unwrap();
        repo.create(&sample("tour.mp4", "video/mp4")).await.unwrap();

        let images = repo
            .list(&ListParams::default(), Some(MediaKind::Image))
            .await
            .unwrap();
        assert_eq!(images.total, 1);
        assert_eq!(images.items[0].filename, "deck.jpg");
    }

    #[tokio::test]
    async fn test_delete_returns_asset() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxMediaRepository::new(pool);

        let asset = repo.create(&sample("deck.jpg", "image/jpeg")).await.unwrap();
        let deleted = repo.delete(asset.id).await.unwrap().unwrap();
        assert_eq!(deleted.filename, "deck.jpg");
        assert!(repo.delete(asset.id).await.unwrap().is_none());
    }
}
