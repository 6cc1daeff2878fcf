//! Booking service
//!
//! Owns the booking lifecycle: price computation, reference codes, status
//! transitions, revenue reporting, and the staff notification fan-out.

use anyhow::{anyhow, Result};
use chrono::{Datelike, TimeZone, Utc};
use std::sync::Arc;
use validator::Validate;

use crate::db::repositories::{
    BookingRepository, DahabiyaRepository, MonthlyRevenue, NotificationRepository,
    PackageRepository,
};
use crate::models::{Booking, BookingStatus, CreateBookingInput, ListParams, PagedResult,
    UpdateBookingInput};
use crate::services::email::EmailService;

/// Number of months covered by the revenue report
const REVENUE_MONTHS: u32 = 6;

/// Attempts at generating a unique reference before giving up
const REFERENCE_ATTEMPTS: u32 = 5;

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Booking not found
    #[error("Booking not found")]
    NotFound,

    /// Referenced dahabiya or package does not exist
    #[error("Unknown booking target: {0}")]
    UnknownTarget(String),

    /// Disallowed status transition
    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Booking service
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    dahabiyas: Arc<dyn DahabiyaRepository>,
    packages: Arc<dyn PackageRepository>,
    notifications: Arc<dyn NotificationRepository>,
    email: Arc<EmailService>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        dahabiyas: Arc<dyn DahabiyaRepository>,
        packages: Arc<dyn PackageRepository>,
        notifications: Arc<dyn NotificationRepository>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            bookings,
            dahabiyas,
            packages,
            notifications,
            email,
        }
    }

    /// Create a booking from a public request.
    ///
    /// The total is always computed here: nights times the vessel's
    /// nightly price for charters, the fixed package price per guest for
    /// packages. Client-supplied amounts are never trusted.
    pub async fn create(
        &self,
        input: CreateBookingInput,
        user_id: Option<i64>,
    ) -> Result<Booking, BookingServiceError> {
        input
            .validate()
            .map_err(|e| BookingServiceError::ValidationError(e.to_string()))?;

        if input.end_date <= input.start_date {
            return Err(BookingServiceError::ValidationError(
                "End date must be after start date".to_string(),
            ));
        }

        let total_price = match (input.dahabiya_id, input.package_id) {
            (Some(dahabiya_id), None) => {
                let vessel = self
                    .dahabiyas
                    .find_by_id(dahabiya_id)
                    .await?
                    .ok_or_else(|| {
                        BookingServiceError::UnknownTarget(format!("dahabiya {}", dahabiya_id))
                    })?;
                let nights = (input.end_date - input.start_date).num_days();
                nights as f64 * vessel.price_per_night
            }
            (None, Some(package_id)) => {
                let package = self.packages.find_by_id(package_id).await?.ok_or_else(|| {
                    BookingServiceError::UnknownTarget(format!("package {}", package_id))
                })?;
                package.price * input.guests as f64
            }
            _ => {
                return Err(BookingServiceError::ValidationError(
                    "Exactly one of dahabiya_id or package_id is required".to_string(),
                ));
            }
        };

        let reference = self.generate_reference().await?;
        let now = Utc::now();
        let booking = Booking {
            id: 0,
            reference,
            user_id,
            dahabiya_id: input.dahabiya_id,
            package_id: input.package_id,
            guest_name: input.guest_name,
            email: input.email,
            phone: input.phone,
            start_date: input.start_date,
            end_date: input.end_date,
            guests: input.guests,
            total_price,
            status: BookingStatus::Pending,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let created = self.bookings.create(&booking).await?;
        self.notify_new_booking(&created).await;
        Ok(created)
    }

    /// New-booking fan-out. The database row must land; email is best
    /// effort and failures only get logged.
    async fn notify_new_booking(&self, booking: &Booking) {
        let title = format!("New booking {}", booking.reference);
        let body = format!(
            "{} booked {} to {} for {} guests (${:.2})",
            booking.guest_name, booking.start_date, booking.end_date, booking.guests,
            booking.total_price
        );

        if let Err(error) = self.notifications.create("booking", &title, &body).await {
            tracing::error!(%error, reference = %booking.reference, "Failed to record booking notification");
        }

        if let Err(error) = self.email.notify_staff(&title, &body).await {
            tracing::warn!(%error, reference = %booking.reference, "Booking notification email not sent");
        }
    }

    async fn generate_reference(&self) -> Result<String, BookingServiceError> {
        for _ in 0..REFERENCE_ATTEMPTS {
            let candidate = new_reference();
            if self
                .bookings
                .find_by_reference(&candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        Err(BookingServiceError::Internal(anyhow!(
            "Could not generate a unique booking reference"
        )))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, BookingServiceError> {
        Ok(self.bookings.find_by_id(id).await?)
    }

    pub async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Booking>, BookingServiceError> {
        Ok(self.bookings.find_by_reference(reference).await?)
    }

    pub async fn list(
        &self,
        params: &ListParams,
        status: Option<BookingStatus>,
    ) -> Result<PagedResult<Booking>, BookingServiceError> {
        Ok(self.bookings.list(params, status).await?)
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Booking>, BookingServiceError> {
        Ok(self.bookings.list_for_user(user_id, params).await?)
    }

    pub async fn update(
        &self,
        id: i64,
        input: &UpdateBookingInput,
    ) -> Result<Booking, BookingServiceError> {
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            if end <= start {
                return Err(BookingServiceError::ValidationError(
                    "End date must be after start date".to_string(),
                ));
            }
        }
        self.bookings
            .update(id, input)
            .await?
            .ok_or(BookingServiceError::NotFound)
    }

    /// Move a booking through its lifecycle, enforcing valid transitions.
    pub async fn set_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<Booking, BookingServiceError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or(BookingServiceError::NotFound)?;

        if !booking.status.can_transition_to(status) {
            return Err(BookingServiceError::InvalidTransition {
                from: booking.status,
                to: status,
            });
        }

        self.bookings.set_status(id, status).await?;
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or(BookingServiceError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BookingServiceError> {
        if !self.bookings.delete(id).await? {
            return Err(BookingServiceError::NotFound);
        }
        Ok(())
    }

    /// Revenue for the last six calendar months including the current
    /// one, oldest first. Months with no qualifying bookings appear with
    /// zero totals so charts always get a full series.
    pub async fn revenue_report(&self) -> Result<Vec<MonthlyRevenue>, BookingServiceError> {
        let now = Utc::now();
        let months: Vec<String> = (0..REVENUE_MONTHS)
            .rev()
            .map(|back| month_label(now.year(), now.month(), back))
            .collect();

        let since_label = &months[0];
        let (year, month) = parse_month_label(since_label)?;
        let since = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| anyhow!("Invalid revenue window start"))?;

        let actual = self.bookings.revenue_by_month(since).await?;

        Ok(months
            .into_iter()
            .map(|month| {
                actual
                    .iter()
                    .find(|r| r.month == month)
                    .cloned()
                    .unwrap_or(MonthlyRevenue {
                        month,
                        total: 0.0,
                        bookings: 0,
                    })
            })
            .collect())
    }

    /// All bookings as CSV, newest first, with a header row.
    pub async fn export_csv(&self) -> Result<String, BookingServiceError> {
        let bookings = self.bookings.list_all().await?;

        let mut out = String::from(
            "reference,guest_name,email,phone,start_date,end_date,guests,total_price,status,created_at\n",
        );
        for b in bookings {
            let fields = [
                b.reference,
                b.guest_name,
                b.email,
                b.phone.unwrap_or_default(),
                b.start_date.to_string(),
                b.end_date.to_string(),
                b.guests.to_string(),
                format!("{:.2}", b.total_price),
                b.status.to_string(),
                b.created_at.to_rfc3339(),
            ];
            let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        Ok(out)
    }
}

/// Generate a "DHB-XXXXXXXX" reference from a fresh UUID.
fn new_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("DHB-{}", id[..8].to_uppercase())
}

/// Quote a CSV field when it contains a comma, quote, or line break.
/// Embedded quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// "YYYY-MM" label for the month `back` months before (year, month).
fn month_label(year: i32, month: u32, back: u32) -> String {
    let total = year * 12 + month as i32 - 1 - back as i32;
    format!("{:04}-{:02}", total.div_euclid(12), total.rem_euclid(12) + 1)
}

fn parse_month_label(label: &str) -> Result<(i32, u32)> {
    let (year, month) = label
        .split_once('-')
        .ok_or_else(|| anyhow!("Bad month label: {}", label))?;
    Ok((year.parse()?, month.parse()?))
}
