//! Gallery models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Gallery category, e.g. "Cabins" or "On Deck"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryCategory {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Sort position (ascending)
    pub sort_order: i64,
    /// Images in the category, sorted by sort_order
    #[serde(default)]
    pub images: Vec<GalleryImage>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Image within a gallery category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Unique identifier
    pub id: i64,
    /// Parent category
    pub category_id: i64,
    /// Image URL
    pub url: String,
    /// Caption shown on hover
    pub caption: Option<String>,
    /// Sort position (ascending)
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating or updating a gallery category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GalleryCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
}

/// Input for adding an image to a category
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GalleryImageInput {
    #[validate(length(min = 1, max = 500))]
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
}
