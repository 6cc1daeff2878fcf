//! Review repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{CreateReviewInput, ListParams, PagedResult, Review, ReviewStatus};

/// Repository trait for review operations
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, input: &CreateReviewInput) -> Result<Review>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Review>>;

    /// List reviews, newest first, optionally filtered by status
    async fn list(
        &self,
        params: &ListParams,
        status: Option<ReviewStatus>,
    ) -> Result<PagedResult<Review>>;

    /// Approved reviews, newest first, optionally limited to one dahabiya
    async fn list_approved(&self, dahabiya_id: Option<i64>) -> Result<Vec<Review>>;

    /// Number of reviews awaiting moderation
    async fn count_pending(&self) -> Result<i64>;

    /// Set the moderation status
    async fn set_status(&self, id: i64, status: ReviewStatus) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based review repository
pub struct SqlxReviewRepository {
    pool: DbPool,
}

impl SqlxReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ReviewRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_review(row: &SqliteRow) -> Result<Review> {
    let status: String = row.get("status");
    Ok(Review {
        id: row.get("id"),
        author_name: row.get("author_name"),
        email: row.get("email"),
        rating: row.get("rating"),
        title: row.get("title"),
        body: row.get("body"),
        dahabiya_id: row.get("dahabiya_id"),
        status: ReviewStatus::from_str(&status)?,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn create(&self, input: &CreateReviewInput) -> Result<Review> {
        let result = sqlx::query(
            "INSERT INTO reviews (author_name, email, rating, title, body, dahabiya_id, status)
             VALUES (?, ?, ?, ?, ?, ?, 'pending')",
        )
        .bind(&input.author_name)
        .bind(&input.email)
        .bind(input.rating)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.dahabiya_id)
        .execute(&self.pool)
        .await
        .context("Failed to insert review")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted review not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>> {
        let row = sqlx::query("SELECT * FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query review by id")?;
        row.as_ref().map(row_to_review).transpose()
    }

    async fn list(
        &self,
        params: &ListParams,
        status: Option<ReviewStatus>,
    ) -> Result<PagedResult<Review>> {
        let (total, rows) = match status {
            Some(status) => {
                let count_row =
                    sqlx::query("SELECT COUNT(*) as count FROM reviews WHERE status = ?")
                        .bind(status.to_string())
                        .fetch_one(&self.pool)
                        .await
                        .context("Failed to count reviews")?;
                let total: i64 = count_row.get("count");
                let rows = sqlx::query(
                    "SELECT * FROM reviews WHERE status = ?
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(status.to_string())
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list reviews")?;
                (total, rows)
            }
            None => {
                let count_row = sqlx::query("SELECT COUNT(*) as count FROM reviews")
                    .fetch_one(&self.pool)
                    .await
                    .context("Failed to count reviews")?;
                let total: i64 = count_row.get("count");
                let rows =
                    sqlx::query("SELECT * FROM reviews ORDER BY created_at DESC LIMIT ? OFFSET ?")
                        .bind(params.limit())
                        .bind(params.offset())
                        .fetch_all(&self.pool)
                        .await
                        .context("Failed to list reviews")?;
                (total, rows)
            }
        };

        let items = rows
            .iter()
            .map(row_to_review)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_approved(&self, dahabiya_id: Option<i64>) -> Result<Vec<Review>> {
        let rows = match dahabiya_id {
            Some(dahabiya_id) => sqlx::query(
                "SELECT * FROM reviews WHERE dahabiya_id = ? AND status = 'approved'
                 ORDER BY created_at DESC",
            )
            .bind(dahabiya_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list approved reviews")?,
            None => sqlx::query(
                "SELECT * FROM reviews WHERE status = 'approved' ORDER BY created_at DESC",
            )
            .fetch_all(&self.pool)
            .await
            .context("Failed to list approved reviews")?,
        };
        rows.iter().map(row_to_review).collect()
    }

    async fn count_pending(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM reviews WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count pending reviews")?;
        Ok(row.get("count"))
    }

    async fn set_status(&self, id: i64, status: ReviewStatus) -> Result<()> {
        sqlx::query("UPDATE reviews SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update review status")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete review")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample(name: &str) -> CreateReviewInput {
        CreateReviewInput {
            author_name: name.to_string(),
            email: None,
            rating: 5,
            title: None,
            body: "Magical sunsets".to_string(),
            dahabiya_id: None,
        }
    }

    #[tokio::test]
    async fn test_new_reviews_start_pending() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxReviewRepository::new(pool);

        let review = repo.create(&sample("Traveller")).await.unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(repo.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_moderation_flow() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxReviewRepository::new(pool);

        let review = repo.create(&sample("Traveller")).await.unwrap();
        repo.set_status(review.id, ReviewStatus::Approved)
            .await
            .unwrap();

        assert_eq!(repo.count_pending().await.unwrap(), 0);
        let approved = repo
            .list(&ListParams::default(), Some(ReviewStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.total, 1);
    }

    #[tokio::test]
    async fn test_approved_listing_skips_pending() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxReviewRepository::new(pool);

        let first = repo.create(&sample("Approved guest")).await.unwrap();
        repo.create(&sample("Pending guest")).await.unwrap();
        repo.set_status(first.id, ReviewStatus::Approved)
            .await
            .unwrap();

        let approved = repo.list_approved(None).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].author_name, "Approved guest");

        // No approved reviews attached to that vessel id
        assert!(repo.list_approved(Some(42)).await.unwrap().is_empty());
    }
}
