//! Dahabiya model
//!
//! A dahabiya is a traditional two-masted sailing vessel. Each record
//! carries the marketing copy, capacity figures, and nightly price used
//! by the public fleet pages and by booking total calculations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Dahabiya entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dahabiya {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: String,
    /// Number of cabins
    pub cabins: i64,
    /// Maximum number of guests
    pub max_guests: i64,
    /// Hull length in metres
    pub length_m: Option<f64>,
    /// Nightly charter price in USD
    pub price_per_night: f64,
    /// Hero image URL
    pub hero_image: Option<String>,
    /// Feature list (JSON array of strings in the database)
    pub features: Vec<String>,
    /// Availability status
    pub status: VesselStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Vessel availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VesselStatus {
    /// Bookable and shown on the public site
    Active,
    /// Hidden from the public site
    Inactive,
}

impl Default for VesselStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl VesselStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VesselStatus::Active => "active",
            VesselStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for VesselStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VesselStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(VesselStatus::Active),
            "inactive" => Ok(VesselStatus::Inactive),
            _ => Err(anyhow::anyhow!("Invalid vessel status: {}", s)),
        }
    }
}

/// Input for creating a dahabiya
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDahabiyaInput {
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cabins: i64,
    #[serde(default)]
    pub max_guests: i64,
    pub length_m: Option<f64>,
    #[validate(range(min = 0.0))]
    pub price_per_night: f64,
    pub hero_image: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub status: Option<VesselStatus>,
}

/// Input for updating a dahabiya. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDahabiyaInput {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cabins: Option<i64>,
    pub max_guests: Option<i64>,
    pub length_m: Option<f64>,
    pub price_per_night: Option<f64>,
    pub hero_image: Option<String>,
    pub features: Option<Vec<String>>,
    pub status: Option<VesselStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vessel_status_round_trip() {
        assert_eq!(
            VesselStatus::from_str("ACTIVE").unwrap(),
            VesselStatus::Active
        );
        assert_eq!(
            VesselStatus::from_str("inactive").unwrap(),
            VesselStatus::Inactive
        );
        assert!(VesselStatus::from_str("drydock").is_err());
    }

    #[test]
    fn test_create_input_rejects_negative_price() {
        let input = CreateDahabiyaInput {
            slug: "queen-cleopatra".to_string(),
            name: "Queen Cleopatra".to_string(),
            description: String::new(),
            cabins: 6,
            max_guests: 12,
            length_m: Some(48.0),
            price_per_night: -10.0,
            hero_image: None,
            features: vec![],
            status: None,
        };
        assert!(input.validate().is_err());
    }
}
