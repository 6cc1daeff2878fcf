//! Itinerary model
//!
//! An itinerary is an ordered list of days. Days are always written as a
//! full replacement set alongside their parent, which keeps the admin
//! editor simple and avoids partial-order states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Itinerary entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Short summary shown on listing pages
    pub summary: String,
    /// Days in ascending day_number order
    #[serde(default)]
    pub days: Vec<ItineraryDay>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A single day within an itinerary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// Unique identifier
    pub id: i64,
    /// Parent itinerary
    pub itinerary_id: i64,
    /// 1-indexed position within the itinerary
    pub day_number: i64,
    /// Day title
    pub title: String,
    /// Day description
    pub description: String,
    /// Included meals, e.g. "B, L, D"
    pub meals: Option<String>,
}

/// Input for creating or replacing an itinerary
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItineraryInput {
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    #[validate]
    pub days: Vec<ItineraryDayInput>,
}

/// Day payload inside an [`ItineraryInput`]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItineraryDayInput {
    #[validate(range(min = 1))]
    pub day_number: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub meals: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_input_requires_positive_day_number() {
        let input = ItineraryDayInput {
            day_number: 0,
            title: "Embarkation".to_string(),
            description: String::new(),
            meals: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_nested_day_validation() {
        let input = ItineraryInput {
            slug: "classic-nile".to_string(),
            name: "Classic Nile".to_string(),
            summary: String::new(),
            days: vec![ItineraryDayInput {
                day_number: 1,
                title: String::new(),
                description: String::new(),
                meals: None,
            }],
        };
        assert!(input.validate().is_err());
    }
}
