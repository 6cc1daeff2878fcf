//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Blog post entity. Content is stored as Markdown alongside its rendered
/// HTML so public reads never pay the rendering cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Post title
    pub title: String,
    /// Markdown source
    pub content: String,
    /// Rendered HTML
    pub content_html: String,
    /// Short excerpt for listing pages
    pub excerpt: String,
    /// Hero image URL
    pub hero_image: Option<String>,
    /// Author user ID
    pub author_id: i64,
    /// Publication status
    pub status: PostStatus,
    /// Publication timestamp (set when first published)
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Post publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Draft - not visible to public
    Draft,
    /// Published - visible to public
    Published,
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(anyhow::anyhow!("Invalid post status: {}", s)),
        }
    }
}

/// Input for creating a blog post
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBlogPostInput {
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub hero_image: Option<String>,
    pub status: Option<PostStatus>,
}

/// Input for updating a blog post. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBlogPostInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub hero_image: Option<String>,
    pub status: Option<PostStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_round_trip() {
        assert_eq!(PostStatus::from_str("draft").unwrap(), PostStatus::Draft);
        assert_eq!(
            PostStatus::from_str("Published").unwrap(),
            PostStatus::Published
        );
        assert!(PostStatus::from_str("archived").is_err());
    }
}
