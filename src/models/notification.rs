//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Back-office notification. Rows are written by the services on events
/// staff care about (new booking, new contact message, new review) and
/// surfaced in the admin header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier
    pub id: i64,
    /// Event kind, e.g. "booking" or "contact"
    pub kind: String,
    /// Short headline
    pub title: String,
    /// Detail text
    pub body: String,
    /// Whether a staff member has seen it
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
