//! Package repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{
    CreatePackageInput, ListParams, Package, PagedResult, UpdatePackageInput, VesselStatus,
};

/// Repository trait for package operations
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn create(&self, input: &CreatePackageInput) -> Result<Package>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Package>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Package>>;
    async fn list(&self, params: &ListParams, active_only: bool) -> Result<PagedResult<Package>>;
    async fn count(&self) -> Result<i64>;
    async fn update(&self, id: i64, input: &UpdatePackageInput) -> Result<Option<Package>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based package repository
pub struct SqlxPackageRepository {
    pool: DbPool,
}

impl SqlxPackageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn PackageRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_package(row: &SqliteRow) -> Result<Package> {
    let status: String = row.get("status");
    Ok(Package {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        duration_days: row.get("duration_days"),
        price: row.get("price"),
        hero_image: row.get("hero_image"),
        itinerary_id: row.get("itinerary_id"),
        status: VesselStatus::from_str(&status)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl PackageRepository for SqlxPackageRepository {
    async fn create(&self, input: &CreatePackageInput) -> Result<Package> {
        let status = input.status.unwrap_or_default();
        let result = sqlx::query(
            "INSERT INTO packages
                 (slug, name, description, duration_days, price, hero_image, itinerary_id, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.duration_days)
        .bind(input.price)
        .bind(&input.hero_image)
        .bind(input.itinerary_id)
        .bind(status.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to insert package")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted package not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Package>> {
        let row = sqlx::query("SELECT * FROM packages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query package by id")?;
        row.as_ref().map(row_to_package).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Package>> {
        let row = sqlx::query("SELECT * FROM packages WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query package by slug")?;
        row.as_ref().map(row_to_package).transpose()
    }

    async fn list(&self, params: &ListParams, active_only: bool) -> Result<PagedResult<Package>> {
        let filter = if active_only {
            "WHERE status = 'active'"
        } else {
            ""
        };

        let count_row = sqlx::query(&format!("SELECT COUNT(*) as count FROM packages {}", filter))
            .fetch_one(&self.pool)
            .await
            .context("Failed to count packages")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(&format!(
            "SELECT * FROM packages {} ORDER BY name LIMIT ? OFFSET ?",
            filter
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list packages")?;

        let items = rows
            .iter()
            .map(row_to_package)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM packages")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count packages")?;
        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdatePackageInput) -> Result<Option<Package>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        // Double Option lets callers clear the itinerary link with null
        let itinerary_id = match &input.itinerary_id {
            Some(value) => *value,
            None => current.itinerary_id,
        };

        sqlx::query(
            "UPDATE packages SET
                 slug = ?, name = ?, description = ?, duration_days = ?, price = ?,
                 hero_image = ?, itinerary_id = ?, status = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(input.slug.as_ref().unwrap_or(&current.slug))
        .bind(input.name.as_ref().unwrap_or(&current.name))
        .bind(input.description.as_ref().unwrap_or(&current.description))
        .bind(input.duration_days.unwrap_or(current.duration_days))
        .bind(input.price.unwrap_or(current.price))
        .bind(input.hero_image.as_ref().or(current.hero_image.as_ref()))
        .bind(itinerary_id)
        .bind(input.status.unwrap_or(current.status).to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update package")?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM packages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete package")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample(slug: &str) -> CreatePackageInput {
        CreatePackageInput {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            duration_days: 5,
            price: 1500.0,
            hero_image: None,
            itinerary_id: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPackageRepository::new(pool);

        let created = repo.create(&sample("luxor-aswan")).await.unwrap();
        assert_eq!(created.duration_days, 5);

        let found = repo.find_by_slug("luxor-aswan").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_update_can_clear_itinerary_link() {
        let pool = create_test_pool().await.unwrap();

        sqlx::query("INSERT INTO itineraries (slug, name) VALUES ('it', 'It')")
            .execute(&pool)
            .await
            .unwrap();

        let repo = SqlxPackageRepository::new(pool);
        let mut input = sample("pkg");
        input.itinerary_id = Some(1);
        let created = repo.create(&input).await.unwrap();
        assert_eq!(created.itinerary_id, Some(1));

        let updated = repo
            .update(
                created.id,
                &UpdatePackageInput {
                    itinerary_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.itinerary_id, None);
    }
}
