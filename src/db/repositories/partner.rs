//! Partner repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Partner, PartnerInput};

/// Repository trait for partner operations
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// All partners ordered by sort_order
    async fn list(&self) -> Result<Vec<Partner>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Partner>>;
    async fn create(&self, input: &PartnerInput) -> Result<Partner>;
    async fn update(&self, id: i64, input: &PartnerInput) -> Result<Option<Partner>>;
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based partner repository
pub struct SqlxPartnerRepository {
    pool: DbPool,
}

impl SqlxPartnerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn PartnerRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_partner(row: &SqliteRow) -> Partner {
    Partner {
        id: row.get("id"),
        name: row.get("name"),
        logo_url: row.get("logo_url"),
        website_url: row.get("website_url"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PartnerRepository for SqlxPartnerRepository {
    async fn list(&self) -> Result<Vec<Partner>> {
        let rows = sqlx::query("SELECT * FROM partners ORDER BY sort_order, name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list partners")?;
        Ok(rows.iter().map(row_to_partner).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Partner>> {
        let row = sqlx::query("SELECT * FROM partners WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query partner")?;
        Ok(row.as_ref().map(row_to_partner))
    }

    async fn create(&self, input: &PartnerInput) -> Result<Partner> {
        let result = sqlx::query(
            "INSERT INTO partners (name, logo_url, website_url, sort_order) VALUES (?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.logo_url)
        .bind(&input.website_url)
        .bind(input.sort_order)
        .execute(&self.pool)
        .await
        .context("Failed to insert partner")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted partner not found")
    }

    async fn update(&self, id: i64, input: &PartnerInput) -> Result<Option<Partner>> {
        let result = sqlx::query(
            "UPDATE partners SET name = ?, logo_url = ?, website_url = ?, sort_order = ?
             WHERE id = ?",
        )
        .bind(&input.name)
        .bind(&input.logo_url)
        .bind(&input.website_url)
        .bind(input.sort_order)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update partner")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM partners WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete partner")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_crud_round_trip() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxPartnerRepository::new(pool);

        let created = repo
            .create(&PartnerInput {
                name: "Egypt Tourism Board".to_string(),
                logo_url: "/uploads/etb.png".to_string(),
                website_url: None,
                sort_order: 0,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &PartnerInput {
                    name: "ETB".to_string(),
                    logo_url: created.logo_url.clone(),
                    website_url: Some("https://example.com".to_string()),
                    sort_order: 1,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "ETB");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.list().await.unwrap().is_empty());
    }
}
