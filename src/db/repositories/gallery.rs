//! Gallery repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{GalleryCategory, GalleryCategoryInput, GalleryImage, GalleryImageInput};

/// Repository trait for gallery operations
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Categories with their images, ordered by sort_order
    async fn list_categories(&self) -> Result<Vec<GalleryCategory>>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<GalleryCategory>>;

    async fn create_category(&self, input: &GalleryCategoryInput) -> Result<GalleryCategory>;

    async fn update_category(
        &self,
        id: i64,
        input: &GalleryCategoryInput,
    ) -> Result<Option<GalleryCategory>>;

    /// Delete a category (images cascade)
    async fn delete_category(&self, id: i64) -> Result<bool>;

    async fn add_image(&self, category_id: i64, input: &GalleryImageInput)
        -> Result<GalleryImage>;

    async fn delete_image(&self, id: i64) -> Result<bool>;
}

/// SQLx-based gallery repository
pub struct SqlxGalleryRepository {
    pool: DbPool,
}

impl SqlxGalleryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn GalleryRepository> {
        Arc::new(Self::new(pool))
    }

    async fn load_images(&self, category_id: i64) -> Result<Vec<GalleryImage>> {
        let rows = sqlx::query(
            "SELECT * FROM gallery_images WHERE category_id = ? ORDER BY sort_order, id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load gallery images")?;

        Ok(rows.iter().map(row_to_image).collect())
    }

    async fn hydrate(&self, row: &SqliteRow) -> Result<GalleryCategory> {
        let id: i64 = row.get("id");
        Ok(GalleryCategory {
            id,
            slug: row.get("slug"),
            name: row.get("name"),
            sort_order: row.get("sort_order"),
            images: self.load_images(id).await?,
            created_at: row.get("created_at"),
        })
    }
}

fn row_to_image(row: &SqliteRow) -> GalleryImage {
    GalleryImage {
        id: row.get("id"),
        category_id: row.get("category_id"),
        url: row.get("url"),
        caption: row.get("caption"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl GalleryRepository for SqlxGalleryRepository {
    async fn list_categories(&self) -> Result<Vec<GalleryCategory>> {
        let rows = sqlx::query("SELECT * FROM gallery_categories ORDER BY sort_order, name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list gallery categories")?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in &rows {
            categories.push(self.hydrate(row).await?);
        }
        Ok(categories)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<GalleryCategory>> {
        let row = sqlx::query("SELECT * FROM gallery_categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query gallery category")?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn create_category(&self, input: &GalleryCategoryInput) -> Result<GalleryCategory> {
        let result =
            sqlx::query("INSERT INTO gallery_categories (slug, name, sort_order) VALUES (?, ?, ?)")
                .bind(&input.slug)
                .bind(&input.name)
                .bind(input.sort_order)
                .execute(&self.pool)
                .await
                .context("Failed to insert gallery category")?;

        let row = sqlx::query("SELECT * FROM gallery_categories WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await
            .context("Inserted gallery category not found")?;
        self.hydrate(&row).await
    }

    async fn update_category(
        &self,
        id: i64,
        input: &GalleryCategoryInput,
    ) -> Result<Option<GalleryCategory>> {
        let result = sqlx::query(
            "UPDATE gallery_categories SET slug = ?, name = ?, sort_order = ? WHERE id = ?",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update gallery category")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM gallery_categories WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Updated gallery category not found")?;
        Ok(Some(self.hydrate(&row).await?))
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery category")?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_image(
        &self,
        category_id: i64,
        input: &GalleryImageInput,
    ) -> Result<GalleryImage> {
        let result = sqlx::query(
            "INSERT INTO gallery_images (category_id, url, caption, sort_order)
             VALUES (?, ?, ?, ?)",
        )
        .bind(category_id)
        .bind(&input.url)
        .bind(&input.caption)
        .bind(input.sort_order)
        .execute(&self.pool)
        .await
        .context("Failed to insert gallery image")?;

        let row = sqlx::query("SELECT * FROM gallery_images WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(&self.pool)
            .await
            .context("Inserted gallery image not found")?;
        Ok(row_to_image(&row))
    }

    async fn delete_image(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery image")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn category(slug: &str, order: i64) -> GalleryCategoryInput {
        GalleryCategoryInput {
            slug: slug.to_string(),
            name: slug.to_string(),
            sort_order: order,
        }
    }

    #[tokio::test]
    async fn test_categories_sorted_with_images() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let deck = repo.create_category(&category("on-deck", 2)).await.unwrap();
        repo.create_category(&category("cabins", 1)).await.unwrap();

        repo.add_image(
            deck.id,
            &GalleryImageInput {
                url: "/uploads/deck1.jpg".to_string(),
                caption: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();

        let categories = repo.list_categories().await.unwrap();
        assert_eq!(categories[0].slug, "cabins");
        assert_eq!(categories[1].slug, "on-deck");
        assert_eq!(categories[1].images.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_category_cascades_images() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool.clone());

        let cat = repo.create_category(&category("cabins", 0)).await.unwrap();
        repo.add_image(
            cat.id,
            &GalleryImageInput {
                url: "/uploads/cabin.jpg".to_string(),
                caption: None,
                sort_order: 0,
            },
        )
        .await
        .unwrap();

        assert!(repo.delete_category(cat.id).await.unwrap());

        let row = sqlx::query("SELECT COUNT(*) as count FROM gallery_images")
            .fetch_one(&pool)
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 0);
    }
}
