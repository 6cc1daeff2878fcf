//! Itinerary repository
//!
//! Days are written as a full replacement set inside one transaction with
//! their parent, so an itinerary is never observable half-edited.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Itinerary, ItineraryDay, ItineraryInput};

/// Repository trait for itinerary operations
#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    /// Insert an itinerary with its days
    async fn create(&self, input: &ItineraryInput) -> Result<Itinerary>;

    /// Find by id, including days
    async fn find_by_id(&self, id: i64) -> Result<Option<Itinerary>>;

    /// Find by slug, including days
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Itinerary>>;

    /// List all itineraries with days, ordered by name
    async fn list(&self) -> Result<Vec<Itinerary>>;

    /// Replace an itinerary and its entire day set
    async fn replace(&self, id: i64, input: &ItineraryInput) -> Result<Option<Itinerary>>;

    /// Delete by id (days cascade), returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based itinerary repository
pub struct SqlxItineraryRepository {
    pool: DbPool,
}

impl SqlxItineraryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ItineraryRepository> {
        Arc::new(Self::new(pool))
    }

    async fn load_days(&self, itinerary_id: i64) -> Result<Vec<ItineraryDay>> {
        let rows = sqlx::query(
            "SELECT * FROM itinerary_days WHERE itinerary_id = ? ORDER BY day_number",
        )
        .bind(itinerary_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load itinerary days")?;

        Ok(rows
            .into_iter()
            .map(|r| ItineraryDay {
                id: r.get("id"),
                itinerary_id: r.get("itinerary_id"),
                day_number: r.get("day_number"),
                title: r.get("title"),
                description: r.get("description"),
                meals: r.get("meals"),
            })
            .collect())
    }

    async fn hydrate(&self, row: &SqliteRow) -> Result<Itinerary> {
        let id: i64 = row.get("id");
        Ok(Itinerary {
            id,
            slug: row.get("slug"),
            name: row.get("name"),
            summary: row.get("summary"),
            days: self.load_days(id).await?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl ItineraryRepository for SqlxItineraryRepository {
    async fn create(&self, input: &ItineraryInput) -> Result<Itinerary> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let result = sqlx::query("INSERT INTO itineraries (slug, name, summary) VALUES (?, ?, ?)")
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.summary)
            .execute(&mut *tx)
            .await
            .context("Failed to insert itinerary")?;
        let id = result.last_insert_rowid();

        for day in &input.days {
            sqlx::query(
                "INSERT INTO itinerary_days (itinerary_id, day_number, title, description, meals)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(day.day_number)
            .bind(&day.title)
            .bind(&day.description)
            .bind(&day.meals)
            .execute(&mut *tx)
            .await
            .context("Failed to insert itinerary day")?;
        }

        tx.commit().await.context("Failed to commit itinerary")?;

        self.find_by_id(id)
            .await?
            .context("Inserted itinerary not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Itinerary>> {
        let row = sqlx::query("SELECT * FROM itineraries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query itinerary by id")?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Itinerary>> {
        let row = sqlx::query("SELECT * FROM itineraries WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query itinerary by slug")?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Itinerary>> {
        let rows = sqlx::query("SELECT * FROM itineraries ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list itineraries")?;

        let mut itineraries = Vec::with_capacity(rows.len());
        for row in &rows {
            itineraries.push(self.hydrate(row).await?);
        }
        Ok(itineraries)
    }

    async fn replace(&self, id: i64, input: &ItineraryInput) -> Result<Option<Itinerary>> {
        if self.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            "UPDATE itineraries SET slug = ?, name = ?, summary = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.summary)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update itinerary")?;

        sqlx::query("DELETE FROM itinerary_days WHERE itinerary_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear itinerary days")?;

        for day in &input.days {
            sqlx::query(
                "INSERT INTO itinerary_days (itinerary_id, day_number, title, description, meals)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(day.day_number)
            .bind(&day.title)
            .bind(&day.description)
            .bind(&day.meals)
            .execute(&mut *tx)
            .await
            .context("Failed to insert itinerary day")?;
        }

        tx.commit().await.context("Failed to commit itinerary")?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM itineraries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete itinerary")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::ItineraryDayInput;

    fn sample(slug: &str, day_count: i64) -> ItineraryInput {
        ItineraryInput {
            slug: slug.to_string(),
            name: slug.to_string(),
            summary: String::new(),
            days: (1..=day_count)
                .map(|n| ItineraryDayInput {
                    day_number: n,
                    title: format!("Day {}", n),
                    description: String::new(),
                    meals: Some("B, L, D".to_string()),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_loads_days_in_order() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxItineraryRepository::new(pool);

        let created = repo.create(&sample("classic", 4)).await.unwrap();
        assert_eq!(created.days.len(), 4);
        assert_eq!(created.days[0].day_number, 1);
        assert_eq!(created.days[3].title, "Day 4");
    }

    #[tokio::test]
    async fn test_replace_swaps_day_set() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxItineraryRepository::new(pool);

        let created = repo.create(&sample("classic", 4)).await.unwrap();
        let replaced = repo
            .replace(created.id, &sample("classic", 2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.days.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_days() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxItineraryRepository::new(pool.clone());

        let created = repo.create(&sample("classic", 3)).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());

        let row = sqlx::query("SELECT COUNT(*) as count FROM itinerary_days")
            .fetch_one(&pool)
            .await
            .unwrap();
        let count: i64 = row.get("count");
        assert_eq!(count, 0);
    }
}
