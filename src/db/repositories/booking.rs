//! Booking repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Booking, BookingStatus, ListParams, PagedResult, UpdateBookingInput};

/// Revenue total for one calendar month
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MonthlyRevenue {
    /// Month in "YYYY-MM" form
    pub month: String,
    /// Sum of booking totals for that month
    pub total: f64,
    /// Number of bookings counted
    pub bookings: i64,
}

/// Repository trait for booking operations
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking and return the stored row
    async fn create(&self, booking: &Booking) -> Result<Booking>;

    /// Find by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>>;

    /// Find by reference code
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>>;

    /// List bookings, newest first, optionally filtered by status
    async fn list(
        &self,
        params: &ListParams,
        status: Option<BookingStatus>,
    ) -> Result<PagedResult<Booking>>;

    /// List bookings belonging to a user, newest first
    async fn list_for_user(&self, user_id: i64, params: &ListParams)
        -> Result<PagedResult<Booking>>;

    /// All bookings, newest first (CSV export)
    async fn list_all(&self) -> Result<Vec<Booking>>;

    /// Total number of bookings
    async fn count(&self) -> Result<i64>;

    /// Number of bookings in a given status
    async fn count_by_status(&self, status: BookingStatus) -> Result<i64>;

    /// Update guest-editable fields
    async fn update(&self, id: i64, input: &UpdateBookingInput) -> Result<Option<Booking>>;

    /// Set the lifecycle status
    async fn set_status(&self, id: i64, status: BookingStatus) -> Result<()>;

    /// Revenue grouped by creation month for revenue-counting statuses,
    /// restricted to bookings created at or after `since`
    async fn revenue_by_month(&self, since: DateTime<Utc>) -> Result<Vec<MonthlyRevenue>>;

    /// Delete a booking
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based booking repository
pub struct SqlxBookingRepository {
    pool: DbPool,
}

impl SqlxBookingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn BookingRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_booking(row: &SqliteRow) -> Result<Booking> {
    let status: String = row.get("status");
    Ok(Booking {
        id: row.get("id"),
        reference: row.get("reference"),
        user_id: row.get("user_id"),
        dahabiya_id: row.get("dahabiya_id"),
        package_id: row.get("package_id"),
        guest_name: row.get("guest_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        guests: row.get("guests"),
        total_price: row.get("total_price"),
        status: BookingStatus::from_str(&status)?,
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl BookingRepository for SqlxBookingRepository {
    async fn create(&self, booking: &Booking) -> Result<Booking> {
        let result = sqlx::query(
            "INSERT INTO bookings
                 (reference, user_id, dahabiya_id, package_id, guest_name, email, phone,
                  start_date, end_date, guests, total_price, status, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.reference)
        .bind(booking.user_id)
        .bind(booking.dahabiya_id)
        .bind(booking.package_id)
        .bind(&booking.guest_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.guests)
        .bind(booking.total_price)
        .bind(booking.status.to_string())
        .bind(&booking.notes)
        .execute(&self.pool)
        .await
        .context("Failed to insert booking")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted booking not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query booking by id")?;
        row.as_ref().map(row_to_booking).transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<Booking>> {
        let row = sqlx::query("SELECT * FROM bookings WHERE reference = ?")
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query booking by reference")?;
        row.as_ref().map(row_to_booking).transpose()
    }

    async fn list(
        &self,
        params: &ListParams,
        status: Option<BookingStatus>,
    ) -> Result<PagedResult<Booking>> {
        let (total, rows) = match status {
            Some(status) => {
                let total = self.count_by_status(status).await?;
                let rows = sqlx::query(
                    "SELECT * FROM bookings WHERE status = ?
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(status.to_string())
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list bookings")?;
                (total, rows)
            }
            None => {
                let total = self.count().await?;
                let rows = sqlx::query(
                    "SELECT * FROM bookings ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .context("Failed to list bookings")?;
                (total, rows)
            }
        };

        let items = rows
            .iter()
            .map(row_to_booking)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Booking>> {
        let count_row = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count user bookings")?;
        let total: i64 = count_row.get("count");

        let rows = sqlx::query(
            "SELECT * FROM bookings WHERE user_id = ?
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list user bookings")?;

        let items = rows
            .iter()
            .map(row_to_booking)
            .collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn list_all(&self) -> Result<Vec<Booking>> {
        let rows = sqlx::query("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list all bookings")?;
        rows.iter().map(row_to_booking).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM bookings")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bookings")?;
        Ok(row.get("count"))
    }

    async fn count_by_status(&self, status: BookingStatus) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM bookings WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bookings by status")?;
        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateBookingInput) -> Result<Option<Booking>> {
        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE bookings SET
                 guest_name = ?, email = ?, phone = ?, start_date = ?, end_date = ?,
                 guests = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(input.guest_name.as_ref().unwrap_or(&current.guest_name))
        .bind(input.email.as_ref().unwrap_or(&current.email))
        .bind(input.phone.as_ref().or(current.phone.as_ref()))
        .bind(input.start_date.unwrap_or(current.start_date))
        .bind(input.end_date.unwrap_or(current.end_date))
        .bind(input.guests.unwrap_or(current.guests))
        .bind(input.notes.as_ref().or(current.notes.as_ref()))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update booking")?;

        self.find_by_id(id).await
    }

    async fn set_status(&self, id: i64, status: BookingStatus) -> Result<()> {
        sqlx::query(
            "UPDATE bookings SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update booking status")?;
        Ok(())
    }

    async fn revenue_by_month(&self, since: DateTime<Utc>) -> Result<Vec<MonthlyRevenue>> {
        let rows = sqlx::query(
            "SELECT strftime('%Y-%m', created_at) as month,
                    SUM(total_price) as total,
                    COUNT(*) as bookings
             FROM bookings
             WHERE status IN ('confirmed', 'completed') AND created_at >= ?
             GROUP BY month
             ORDER BY month",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query monthly revenue")?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlyRevenue {
                month: r.get("month"),
                total: r.get("total"),
                bookings: r.get("bookings"),
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete booking")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use chrono::NaiveDate;

    fn sample(reference: &str, status: BookingStatus, total: f64) -> Booking {
        let now = Utc::now();
        Booking {
            id: 0,
            reference: reference.to_string(),
            user_id: None,
            dahabiya_id: None,
            package_id: None,
            guest_name: "Guest".to_string(),
            email: "guest@example.com".to_string(),
            phone: None,
            start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            guests: 2,
            total_price: total,
            status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_reference() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxBookingRepository::new(pool);

        let created = repo
            .create(&sample("DHB-AB12CD", BookingStatus::Pending, 3600.0))
            .await
            .unwrap();
        assert!(created.id > 0);

        let found = repo.find_by_reference("DHB-AB12CD").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.total_price, 3600.0);
    }

    #[tokio::test]
    async fn test_duplicate_reference_rejected() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxBookingRepository::new(pool);

        repo.create(&sample("DHB-SAME", BookingStatus::Pending, 1.0))
            .await
            .unwrap();
        assert!(repo
            .create(&sample("DHB-SAME", BookingStatus::Pending, 1.0))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_status_filtering() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxBookingRepository::new(pool);

        repo.create(&sample("DHB-1", BookingStatus::Pending, 100.0))
            .await
            .unwrap();
        repo.create(&sample("DHB-2", BookingStatus::Confirmed, 200.0))
            .await
            .unwrap();

        let pending = repo
            .list(&ListParams::default(), Some(BookingStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending.total, 1);
        assert_eq!(pending.items[0].reference, "DHB-1");

        assert_eq!(
            repo.count_by_status(BookingStatus::Confirmed).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_revenue_excludes_pending_and_cancelled() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxBookingRepository::new(pool);

        repo.create(&sample("DHB-P", BookingStatus::Pending, 1000.0))
            .await
            .unwrap();
        repo.create(&sample("DHB-C", BookingStatus::Confirmed, 2000.0))
            .await
            .unwrap();
        repo.create(&sample("DHB-D", BookingStatus::Completed, 500.0))
            .await
            .unwrap();
        repo.create(&sample("DHB-X", BookingStatus::Cancelled, 9000.0))
            .await
            .unwrap();

        let since = Utc::now() - chrono::Duration::days(30);
        let revenue = repo.revenue_by_month(since).await.unwrap();
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].total, 2500.0);
        assert_eq!(revenue[0].bookings, 2);
    }

    #[tokio::test]
    async fn test_set_status() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxBookingRepository::new(pool);

        let booking = repo
            .create(&sample("DHB-S", BookingStatus::Pending, 100.0))
            .await
            .unwrap();
        repo.set_status(booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();

        let updated = repo.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
    }
}
