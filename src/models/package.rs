//! Cruise package model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::dahabiya::VesselStatus;

/// Cruise package entity. A package bundles a fixed duration and price,
/// optionally tied to a day-by-day itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: String,
    /// Duration in days
    pub duration_days: i64,
    /// Total package price per person in USD
    pub price: f64,
    /// Hero image URL
    pub hero_image: Option<String>,
    /// Linked itinerary, if any
    pub itinerary_id: Option<i64>,
    /// Visibility status (shares the vessel status vocabulary)
    pub status: VesselStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a package
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePackageInput {
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1))]
    pub duration_days: i64,
    #[validate(range(min = 0.0))]
    pub price: f64,
    pub hero_image: Option<String>,
    pub itinerary_id: Option<i64>,
    pub status: Option<VesselStatus>,
}

/// Input for updating a package. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePackageInput {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<i64>,
    pub price: Option<f64>,
    pub hero_image: Option<String>,
    pub itinerary_id: Option<Option<i64>>,
    pub status: Option<VesselStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_input_requires_positive_duration() {
        let input = CreatePackageInput {
            slug: "luxor-aswan".to_string(),
            name: "Luxor to Aswan".to_string(),
            description: String::new(),
            duration_days: 0,
            price: 1200.0,
            hero_image: None,
            itinerary_id: None,
            status: None,
        };
        assert!(input.validate().is_err());
    }
}
