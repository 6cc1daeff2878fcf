//! Dahabiya repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{
    CreateDahabiyaInput, Dahabiya, ListParams, PagedResult, UpdateDahabiyaInput, VesselStatus,
};

/// Repository trait for dahabiya operations
#[async_trait]
pub trait DahabiyaRepository: Send + Sync {
    /// Insert a dahabiya and return the stored row
    async fn create(&self, input: &CreateDahabiyaInput) -> Result<Dahabiya>;

    /// Find by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Dahabiya>>;

    /// Find by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Dahabiya>>;

    /// List with pagination. When `active_only` is set, inactive vessels
    /// are excluded (public listings).
    async fn list(&self, params: &ListParams, active_only: bool) -> Result<PagedResult<Dahabiya>>;

    /// Total number of vessels
    async fn count(&self) -> Result<i64>;

    /// Apply a partial update, returning the stored row
    async fn update(&self, id: i64, input: &UpdateDahabiyaInput) -> Result<Option<Dahabiya>>;

    /// Delete by id, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based dahabiya repository
pub struct SqlxDahabiyaRepository {
    pool: DbPool,
}

impl SqlxDahabiyaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn DahabiyaRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_dahabiya(row: &SqliteRow) -> Result<Dahabiya> {
    let status: String = row.get("status");
    let features_json: String = row.get("features");
    Ok(Dahabiya {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        cabins: row.get("cabins"),
        max_guests: row.get("max_guests"),
        length_m: row.get("length_m"),
        price_per_night: row.get("price_per_night"),
        hero_image: row.get("hero_image"),
        features: serde_json::from_str(&features_json).unwrap_or_default(),
        status: VesselStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl DahabiyaRepository for SqlxDahabiyaRepository {
    async fn create(&self, input: &CreateDahabiyaInput) -> Result<Dahabiya> {
        let features = serde_json::to_string(&input.features)
            .context("Failed to serialize features")?;
        let status = input.status.unwrap_or_default();

        let result = sqlx::query(
            "INSERT INTO dahabiyas
                 (slug, name, description, cabins, max_guests, length_m,
                  price_per_night, hero_image, features, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.cabins)
        .bind(input.max_guests)
        .bind(input.length_m)
        .bind(input.price_per_night)
        .bind(&input.hero_image)
        .bind(features)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to insert dahabiya")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted dahabiya not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Dahabiya>> {
        let row = sqlx::query("SELECT * FROM dahabiyas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query dahabiya by id")?;
        row.as_ref().map(row_to_dahabiya).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Dahabiya>> {
        let row = sqlx::query("SELECT * FROM dahabiyas WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query dahabiya by slug")?;
        row.as_ref().map(row_to_dahabiya).transpose()
    }

    async fn list(&self, params: &ListParams, active_only: bool) -> Result<PagedResult<Dahabiya>> {
        let filter = if active_only {
            "WHERE status = 'active'"
        } else {
            ""
        };

        let count_row = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM dahabiyas {}",
            filter
        ))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count dahabiyas")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(&format!(
            "SELECT * FROM dahabiyas {} ORDER BY name LIMIT ? OFFSET ?",
            filter
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list dahabiyas")?;

        let items = rows
            .iter()
            .map(row_to_dahabiya)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM dahabiyas")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count dahabiyas")?;
        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateDahabiyaInput) -> Result<Option<Dahabiya>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let features = input.features.as_ref().unwrap_or(&current.features);
        let features_json =
            serde_json::to_string(features).context("Failed to serialize features")?;

        sqlx::query(
            "UPDATE dahabiyas SET
                 slug = ?, name = ?, description = ?, cabins = ?, max_guests = ?,
                 length_m = ?, price_per_night = ?, hero_image = ?, features = ?,
                 status = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(input.slug.as_ref().unwrap_or(&current.slug))
        .bind(input.name.as_ref().unwrap_or(&current.name))
        .bind(input.description.as_ref().unwrap_or(&current.description))
        .bind(input.cabins.unwrap_or(current.cabins))
        .bind(input.max_guests.unwrap_or(current.max_guests))
        .bind(input.length_m.or(current.length_m))
        .bind(input.price_per_night.unwrap_or(current.price_per_night))
        .bind(input.hero_image.as_ref().or(current.hero_image.as_ref()))
        .bind(features_json)
        .bind(input.status.unwrap_or(current.status).to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update dahabiya")?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dahabiyas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete dahabiya")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample(slug: &str) -> CreateDahabiyaInput {
        CreateDahabiyaInput {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            cabins: 6,
            max_guests: 12,
            length_m: Some(48.0),
            price_per_night: 900.0,
            hero_image: None,
            features: vec!["sun deck".to_string()],
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_slug() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxDahabiyaRepository::new(pool);

        let created = repo.create(&sample("queen-cleopatra")).await.unwrap();
        assert_eq!(created.status, VesselStatus::Active);
        assert_eq!(created.features, vec!["sun deck".to_string()]);

        let found = repo.find_by_slug("queen-cleopatra").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_active_only_listing() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxDahabiyaRepository::new(pool);

        let a = repo.create(&sample("active-boat")).await.unwrap();
        let b = repo.create(&sample("hidden-boat")).await.unwrap();
        repo.update(
            b.id,
            &UpdateDahabiyaInput {
                status: Some(VesselStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let public = repo.list(&ListParams::default(), true).await.unwrap();
        assert_eq!(public.total, 1);
        assert_eq!(public.items[0].id, a.id);

        let all = repo.list(&ListParams::default(), false).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unset_fields() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxDahabiyaRepository::new(pool);

        let created = repo.create(&sample("nile-queen")).await.unwrap();
        let updated = repo
            .update(
                created.id,
                &UpdateDahabiyaInput {
                    price_per_night: Some(1200.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price_per_night, 1200.0);
        assert_eq!(updated.slug, "nile-queen");
        assert_eq!(updated.cabins, 6);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxDahabiyaRepository::new(pool);
        let result = repo
            .update(999, &UpdateDahabiyaInput::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
