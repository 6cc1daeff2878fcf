//! Partner model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Partner or affiliation shown in the site footer strip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    /// Unique identifier
    pub id: i64,
    /// Partner name
    pub name: String,
    /// Logo image URL
    pub logo_url: String,
    /// Partner website, if any
    pub website_url: Option<String>,
    /// Sort position (ascending)
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a partner
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartnerInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub logo_url: String,
    pub website_url: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}
