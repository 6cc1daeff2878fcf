//! Website content model
//!
//! The content store is a keyed table of editable site copy. Every public
//! page is assembled from entries grouped by `page` and `section`, so staff
//! can change wording and imagery without a deploy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// A single editable content entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEntry {
    /// Unique identifier
    pub id: i64,
    /// Globally unique key, e.g. "home_hero_title"
    pub key: String,
    /// Label shown in the admin editor
    pub title: Option<String>,
    /// The content value (text, HTML, or an image URL depending on kind)
    pub value: String,
    /// How the value should be interpreted
    pub kind: ContentKind,
    /// Page the entry belongs to, e.g. "home" or "global"
    pub page: String,
    /// Section within the page, e.g. "hero"
    pub section: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Content value interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain text, escaped on render
    Text,
    /// Trusted HTML fragment
    Html,
    /// Image URL
    Image,
}

impl Default for ContentKind {
    fn default() -> Self {
        Self::Text
    }
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Html => "html",
            ContentKind::Image => "image",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            "html" => Ok(ContentKind::Html),
            "image" => Ok(ContentKind::Image),
            _ => Err(anyhow::anyhow!("Invalid content kind: {}", s)),
        }
    }
}

/// Input for creating or replacing a content entry. Upserts are keyed on
/// `key`; writing an existing key overwrites its value and metadata.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertContentInput {
    #[validate(length(min = 1, max = 200))]
    pub key: String,
    pub title: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(default = "default_section")]
    pub section: String,
}

fn default_page() -> String {
    "global".to_string()
}

fn default_section() -> String {
    "general".to_string()
}

/// All content for one page, grouped by section. BTreeMap keeps section
/// order stable across responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// Page name
    pub page: String,
    /// Entries grouped by section
    pub sections: BTreeMap<String, Vec<ContentEntry>>,
}

impl PageContent {
    /// Group a flat list of entries into sections. Entries keep their
    /// incoming order within each section.
    pub fn from_entries(page: &str, entries: Vec<ContentEntry>) -> Self {
        let mut sections: BTreeMap<String, Vec<ContentEntry>> = BTreeMap::new();
        for entry in entries {
            sections.entry(entry.section.clone()).or_default().push(entry);
        }
        Self {
            page: page.to_string(),
            sections,
        }
    }

    /// Total number of entries across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, section: &str) -> ContentEntry {
        let now = Utc::now();
        ContentEntry {
            id: 0,
            key: key.to_string(),
            title: None,
            value: String::new(),
            kind: ContentKind::Text,
            page: "home".to_string(),
            section: section.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_page_content_groups_by_section() {
        let entries = vec![
            entry("home_hero_title", "hero"),
            entry("home_hero_subtitle", "hero"),
            entry("home_about_text", "about"),
        ];
        let page = PageContent::from_entries("home", entries);

        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.sections["hero"].len(), 2);
        assert_eq!(page.sections["about"].len(), 1);
        assert_eq!(page.len(), 3);
    }

    #[test]
    fn test_page_content_preserves_entry_order_within_section() {
        let entries = vec![
            entry("first", "hero"),
            entry("second", "hero"),
        ];
        let page = PageContent::from_entries("home", entries);
        let hero = &page.sections["hero"];
        assert_eq!(hero[0].key, "first");
        assert_eq!(hero[1].key, "second");
    }

    #[test]
    fn test_content_kind_round_trip() {
        for kind in [ContentKind::Text, ContentKind::Html, ContentKind::Image] {
            assert_eq!(ContentKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(ContentKind::from_str("markdown").is_err());
    }
}
