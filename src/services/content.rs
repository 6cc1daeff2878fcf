//! Website content service
//!
//! The editable copy behind every public page lives in the content store.
//! This service fronts the repository with a read cache and owns the two
//! policies that are easy to get wrong in handlers: page assembly and
//! logo resolution.
//!
//! Cache keys use the `content:` prefix; any write drops the whole prefix
//! so readers never see a stale mix of old and new entries.

use anyhow::Result;
use std::sync::Arc;
use validator::Validate;

use crate::cache::MemoryCache;
use crate::db::repositories::ContentRepository;
use crate::models::{ContentEntry, ContentKind, PageContent, UpsertContentInput};

/// Well-known content keys
pub mod content_keys {
    /// Site display name
    pub const SITE_NAME: &str = "site_name";
    /// Site description / tagline
    pub const SITE_DESCRIPTION: &str = "site_description";
    /// Primary site logo
    pub const SITE_LOGO: &str = "site_logo";
    /// Navbar-specific logo override
    pub const NAVBAR_LOGO: &str = "navbar_logo";
    /// Footer HTML fragment
    pub const FOOTER_TEXT: &str = "footer_text";
    /// SMTP settings consumed by the email service
    pub const SMTP_HOST: &str = "smtp_host";
    pub const SMTP_PORT: &str = "smtp_port";
    pub const SMTP_USERNAME: &str = "smtp_username";
    pub const SMTP_PASSWORD: &str = "smtp_password";
    pub const SMTP_FROM: &str = "smtp_from";
    /// Address that receives staff notification emails
    pub const NOTIFY_EMAIL: &str = "notify_email";
}

/// Fallback logo served when no usable logo is stored
pub const DEFAULT_LOGO: &str = "/images/logo.png";

/// Error types for content operations
#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Entry not found
    #[error("Content entry not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Resolved logo with a cache-busting URL
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedLogo {
    /// URL with `?v=` version parameter when the logo comes from the store
    pub url: String,
    /// Which key supplied it, absent for the fallback
    pub source: Option<String>,
}

/// Content service
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    cache: Arc<MemoryCache>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Get one entry by key.
    pub async fn get(&self, key: &str) -> Result<Option<ContentEntry>, ContentServiceError> {
        let cache_key = format!("content:key:{}", key);
        if let Some(cached) = self.cache.get::<Option<ContentEntry>>(&cache_key).await? {
            return Ok(cached);
        }

        let entry = self.repo.get(key).await?;
        self.cache.set(&cache_key, &entry).await?;
        Ok(entry)
    }

    /// Get one entry by key with media versioning applied (public reads).
    pub async fn get_resolved(
        &self,
        key: &str,
    ) -> Result<Option<ContentEntry>, ContentServiceError> {
        let mut entry = self.get(key).await?;
        if let Some(entry) = entry.as_mut() {
            version_entry(entry);
        }
        Ok(entry)
    }

    /// Get all content for a page, grouped by section, with media
    /// versioning applied. The cache holds the raw entries; version
    /// parameters are attached on the way out.
    pub async fn get_page(&self, page: &str) -> Result<PageContent, ContentServiceError> {
        let cache_key = format!("content:page:{}", page);
        let mut content = match self.cache.get::<PageContent>(&cache_key).await? {
            Some(cached) => cached,
            None => {
                let entries = self.repo.get_page(page).await?;
                let content = PageContent::from_entries(page, entries);
                self.cache.set(&cache_key, &content).await?;
                content
            }
        };

        for entries in content.sections.values_mut() {
            for entry in entries.iter_mut() {
                version_entry(entry);
            }
        }
        Ok(content)
    }

    /// Every entry in the store (admin editor).
    pub async fn get_all(&self) -> Result<Vec<ContentEntry>, ContentServiceError> {
        Ok(self.repo.get_all().await?)
    }

    /// Distinct page names.
    pub async fn list_pages(&self) -> Result<Vec<String>, ContentServiceError> {
        Ok(self.repo.list_pages().await?)
    }

    /// Create or overwrite an entry, then drop all cached content.
    pub async fn upsert(
        &self,
        input: UpsertContentInput,
    ) -> Result<ContentEntry, ContentServiceError> {
        input
            .validate()
            .map_err(|e| ContentServiceError::ValidationError(e.to_string()))?;

        let entry = self.repo.upsert(&input).await?;
        self.cache.delete_prefix("content:").await;
        Ok(entry)
    }

    /// Delete an entry by key.
    pub async fn delete(&self, key: &str) -> Result<(), ContentServiceError> {
        if !self.repo.delete(key).await? {
            return Err(ContentServiceError::NotFound(key.to_string()));
        }
        self.cache.delete_prefix("content:").await;
        Ok(())
    }

    /// Resolve the site logo.
    ///
    /// Both logo keys are consulted and the most recently updated usable
    /// value wins. Values that are empty or carry a `blob:` scheme (a
    /// browser-local object URL pasted by mistake) are unusable. When
    /// nothing usable is stored the bundled fallback is returned without
    /// a version parameter.
    pub async fn resolve_logo(&self) -> Result<ResolvedLogo, ContentServiceError> {
        let mut candidates = Vec::new();
        for key in [content_keys::SITE_LOGO, content_keys::NAVBAR_LOGO] {
            if let Some(entry) = self.get(key).await? {
                if is_usable_logo(&entry.value) {
                    candidates.push(entry);
                }
            }
        }

        candidates.sort_by_key(|e| e.updated_at);
        match candidates.pop() {
            Some(entry) => Ok(ResolvedLogo {
                url: format!("{}?v={}", entry.value, entry.updated_at.timestamp()),
                source: Some(entry.key),
            }),
            None => Ok(ResolvedLogo {
                url: DEFAULT_LOGO.to_string(),
                source: None,
            }),
        }
    }

    /// Plain value lookup with a default, used for settings-like keys.
    pub async fn get_value_or(&self, key: &str, default: &str) -> String {
        match self.get(key).await {
            Ok(Some(entry)) if !entry.value.is_empty() => entry.value,
            _ => default.to_string(),
        }
    }
}

fn is_usable_logo(value: &str) -> bool {
    !value.trim().is_empty() && !value.trim_start().starts_with("blob:")
}

/// Append `?v=<updated_at>` to image-valued entries so clients re-fetch
/// after an admin swaps the underlying file. Text and HTML entries pass
/// through untouched, as do internal reads (settings, logo resolution).
fn version_entry(entry: &mut ContentEntry) {
    if entry.kind == ContentKind::Image && !entry.value.trim().is_empty() {
        entry.value = format!("{}?v={}", entry.value, entry.updated_at.timestamp());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxContentRepository;
    use crate::models::ContentKind;

    async fn service() -> ContentService {
        let pool = create_test_pool().await.unwrap();
        ContentService::new(
            SqlxContentRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
        )
    }

    fn input(key: &str, page: &str, section: &str, value: &str) -> UpsertContentInput {
        UpsertContentInput {
            key: key.to_string(),
            title: None,
            value: value.to_string(),
            kind: ContentKind::Text,
            page: page.to_string(),
            section: section.to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_invalidates_page_cache() {
        let service = service().await;

        service
            .upsert(input("home_hero_title", "home", "hero", "Old"))
            .await
            .unwrap();
        let before = service.get_page("home").await.unwrap();
        assert_eq!(before.sections["hero"][0].value, "Old");

        service
            .upsert(input("home_hero_title", "home", "hero", "New"))
            .await
            .unwrap();
        let after = service.get_page("home").await.unwrap();
        assert_eq!(after.sections["hero"][0].value, "New");
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let service = service().await;
        let result = service.upsert(input("", "home", "hero", "x")).await;
        assert!(matches!(
            result,
            Err(ContentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = service().await;
        let result = service.delete("no-such-key").await;
        assert!(matches!(result, Err(ContentServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_logo_prefers_newest_usable_value() {
        let service = service().await;

        // Seeded site_logo exists; navbar_logo written later should win
        service
            .upsert(UpsertContentInput {
                key: content_keys::NAVBAR_LOGO.to_string(),
                title: None,
                value: "/uploads/navbar.png".to_string(),
                kind: ContentKind::Image,
                page: "global".to_string(),
                section: "branding".to_string(),
            })
            .await
            .unwrap();

        let logo = service.resolve_logo().await.unwrap();
        assert!(logo.url.starts_with("/uploads/navbar.png?v="));
        assert_eq!(logo.source.as_deref(), Some(content_keys::NAVBAR_LOGO));
    }

    #[tokio::test]
    async fn test_blob_urls_are_rejected() {
        let service = service().await;

        for key in [content_keys::SITE_LOGO, content_keys::NAVBAR_LOGO] {
            service
                .upsert(UpsertContentInput {
                    key: key.to_string(),
                    title: None,
                    value: "blob:https://example.com/abc".to_string(),
                    kind: ContentKind::Image,
                    page: "global".to_string(),
                    section: "branding".to_string(),
                })
                .await
                .unwrap();
        }

        let logo = service.resolve_logo().await.unwrap();
        assert_eq!(logo.url, DEFAULT_LOGO);
        assert_eq!(logo.source, None);
    }

    #[tokio::test]
    async fn test_logo_falls_back_when_store_is_empty() {
        let service = service().await;
        service.delete(content_keys::SITE_LOGO).await.unwrap();

        let logo = service.resolve_logo().await.unwrap();
        assert_eq!(logo.url, DEFAULT_LOGO);
    }

    #[tokio::test]
    async fn test_image_entries_are_versioned_on_public_reads() {
        let service = service().await;

        service
            .upsert(UpsertContentInput {
                key: "home_hero_image".to_string(),
                title: None,
                value: "/uploads/hero.jpg".to_string(),
                kind: ContentKind::Image,
                page: "home".to_string(),
                section: "hero".to_string(),
            })
            .await
            .unwrap();
        service
            .upsert(input("home_hero_title", "home", "hero", "Welcome"))
            .await
            .unwrap();

        let page = service.get_page("home").await.unwrap();
        let by_key = |key: &str| {
            page.sections["hero"]
                .iter()
                .find(|e| e.key == key)
                .unwrap()
                .value
                .clone()
        };
        assert!(by_key("home_hero_image").starts_with("/uploads/hero.jpg?v="));
        assert_eq!(by_key("home_hero_title"), "Welcome");

        // Single-entry public read carries the version; raw read does not
        let resolved = service.get_resolved("home_hero_image").await.unwrap().unwrap();
        assert!(resolved.value.starts_with("/uploads/hero.jpg?v="));
        let raw = service.get("home_hero_image").await.unwrap().unwrap();
        assert_eq!(raw.value, "/uploads/hero.jpg");

        // Versioning is applied per read, never accumulated in the cache
        let again = service.get_page("home").await.unwrap();
        assert_eq!(
            again.sections["hero"]
                .iter()
                .filter(|e| e.value.matches("?v=").count() == 1)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_get_value_or_default() {
        let service = service().await;
        assert_eq!(service.get_value_or("smtp_host", "").await, "");
        assert_eq!(
            service.get_value_or("site_name", "x").await,
            "Dahabiyat Nile Cruises"
        );
    }
}
