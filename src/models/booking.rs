//! Booking model
//!
//! Bookings can target either a dahabiya charter (priced per night) or a
//! fixed package. The total is always computed server side; any amount
//! sent by a client is ignored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i64,
    /// Human-facing reference code (unique)
    pub reference: String,
    /// Registered user who booked, if any
    pub user_id: Option<i64>,
    /// Booked dahabiya, if a charter booking
    pub dahabiya_id: Option<i64>,
    /// Booked package, if a package booking
    pub package_id: Option<i64>,
    /// Lead guest name
    pub guest_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Cruise start date
    pub start_date: NaiveDate,
    /// Cruise end date
    pub end_date: NaiveDate,
    /// Party size
    pub guests: i64,
    /// Server-computed total in USD
    pub total_price: f64,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Free-form notes from the guest or staff
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Number of nights between start and end date.
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(0)
    }
}

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting staff confirmation
    Pending,
    /// Confirmed by staff
    Confirmed,
    /// Cancelled by guest or staff
    Cancelled,
    /// Cruise took place
    Completed,
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether the booking counts toward revenue reporting.
    pub fn counts_as_revenue(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }

    /// Valid transitions out of this status. Terminal states allow none.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        match self {
            BookingStatus::Pending => {
                matches!(next, BookingStatus::Confirmed | BookingStatus::Cancelled)
            }
            BookingStatus::Confirmed => {
                matches!(next, BookingStatus::Completed | BookingStatus::Cancelled)
            }
            BookingStatus::Cancelled | BookingStatus::Completed => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid booking status: {}", s)),
        }
    }
}

/// Input for creating a booking
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingInput {
    /// Dahabiya to charter (mutually exclusive with package_id)
    pub dahabiya_id: Option<i64>,
    /// Package to book (mutually exclusive with dahabiya_id)
    pub package_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 1, max = 100))]
    pub guests: i64,
    pub notes: Option<String>,
}

/// Input for updating a booking from the back office
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookingInput {
    pub guest_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub guests: Option<i64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_nights() {
        let booking = Booking {
            id: 1,
            reference: "DHB-TEST".to_string(),
            user_id: None,
            dahabiya_id: Some(1),
            package_id: None,
            guest_name: "Guest".to_string(),
            email: "g@example.com".to_string(),
            phone: None,
            start_date: date("2026-10-01"),
            end_date: date("2026-10-05"),
            guests: 2,
            total_price: 0.0,
            status: BookingStatus::Pending,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(booking.nights(), 4);
    }

    #[test]
    fn test_status_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));

        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));

        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_revenue_statuses() {
        assert!(!BookingStatus::Pending.counts_as_revenue());
        assert!(BookingStatus::Confirmed.counts_as_revenue());
        assert!(BookingStatus::Completed.counts_as_revenue());
        assert!(!BookingStatus::Cancelled.counts_as_revenue());
    }

    #[test]
    fn test_create_input_validation() {
        let input = CreateBookingInput {
            dahabiya_id: Some(1),
            package_id: None,
            guest_name: String::new(),
            email: "bad".to_string(),
            phone: None,
            start_date: date("2026-10-01"),
            end_date: date("2026-10-05"),
            guests: 0,
            notes: None,
        };
        assert!(input.validate().is_err());
    }
}
