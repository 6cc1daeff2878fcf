//! Guest review model
//!
//! Reviews are submitted publicly and held in a moderation queue; only
//! approved reviews appear on the site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Guest review entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: i64,
    /// Display name of the reviewer
    pub author_name: String,
    /// Contact email, never shown publicly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Star rating, 1 to 5
    pub rating: i64,
    /// Optional headline
    pub title: Option<String>,
    /// Review body
    pub body: String,
    /// Reviewed dahabiya, if any
    pub dahabiya_id: Option<i64>,
    /// Moderation status
    pub status: ReviewStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Review moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Awaiting moderation
    Pending,
    /// Shown on the public site
    Approved,
    /// Hidden permanently
    Rejected,
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid review status: {}", s)),
        }
    }
}

/// Input for submitting a review
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewInput {
    #[validate(length(min = 1, max = 200))]
    pub author_name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    pub dahabiya_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut input = CreateReviewInput {
            author_name: "Sailor".to_string(),
            email: None,
            rating: 6,
            title: None,
            body: "Wonderful trip".to_string(),
            dahabiya_id: None,
        };
        assert!(input.validate().is_err());
        input.rating = 5;
        assert!(input.validate().is_ok());
        input.rating = 0;
        assert!(input.validate().is_err());
    }
}
