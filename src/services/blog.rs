//! Blog service
//!
//! Markdown rendering and publication state. Posts keep their rendered
//! HTML in the database; the render happens once per write.

use anyhow::Result;
use chrono::Utc;
use pulldown_cmark::{html, Options, Parser};
use std::sync::Arc;
use validator::Validate;

use crate::db::repositories::BlogRepository;
use crate::models::{
    BlogPost, CreateBlogPostInput, ListParams, PagedResult, PostStatus, UpdateBlogPostInput,
};

/// Error types for blog operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Post not found")]
    NotFound,

    #[error("Slug already in use: {0}")]
    SlugTaken(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Blog service
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        input: CreateBlogPostInput,
        author_id: i64,
    ) -> Result<BlogPost, BlogServiceError> {
        input
            .validate()
            .map_err(|e| BlogServiceError::ValidationError(e.to_string()))?;

        if self.repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(BlogServiceError::SlugTaken(input.slug));
        }

        let status = input.status.unwrap_or_default();
        let now = Utc::now();
        let post = BlogPost {
            id: 0,
            slug: input.slug,
            title: input.title,
            content_html: render_markdown(&input.content),
            content: input.content,
            excerpt: input.excerpt,
            hero_image: input.hero_image,
            author_id,
            status,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        };
        Ok(self.repo.create(&post).await?)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateBlogPostInput,
    ) -> Result<BlogPost, BlogServiceError> {
        let mut post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(BlogServiceError::NotFound)?;

        if let Some(slug) = input.slug {
            if slug != post.slug {
                if self.repo.find_by_slug(&slug).await?.is_some() {
                    return Err(BlogServiceError::SlugTaken(slug));
                }
                post.slug = slug;
            }
        }
        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content_html = render_markdown(&content);
            post.content = content;
        }
        if let Some(excerpt) = input.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(hero_image) = input.hero_image {
            post.hero_image = Some(hero_image);
        }
        if let Some(status) = input.status {
            // First publish stamps published_at; republishing keeps it
            if status == PostStatus::Published && post.published_at.is_none() {
                post.published_at = Some(Utc::now());
            }
            post.status = status;
        }

        Ok(self.repo.update(&post).await?)
    }

    /// Published post by slug, for the public site.
    pub async fn get_published(&self, slug: &str) -> Result<Option<BlogPost>, BlogServiceError> {
        let post = self.repo.find_by_slug(slug).await?;
        Ok(post.filter(|p| p.status == PostStatus::Published))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>, BlogServiceError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    pub async fn list(
        &self,
        params: &ListParams,
        published_only: bool,
    ) -> Result<PagedResult<BlogPost>, BlogServiceError> {
        Ok(self.repo.list(params, published_only).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BlogServiceError> {
        if !self.repo.delete(id).await? {
            return Err(BlogServiceError::NotFound);
        }
        Ok(())
    }
}

/// Render Markdown to HTML with tables and strikethrough enabled.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxBlogRepository, SqlxUserRepository, UserRepository};
    use crate::models::{User, UserRole};

    async fn setup() -> (BlogService, i64) {
        let pool = create_test_pool().await.unwrap();
        let users = SqlxUserRepository::new(pool.clone());
        let author = users
            .create(&User::new(
                "writer".to_string(),
                "writer@example.com".to_string(),
                "hash".to_string(),
                UserRole::Staff,
            ))
            .await
            .unwrap();
        (BlogService::new(SqlxBlogRepository::boxed(pool)), author.id)
    }

    fn input(slug: &str) -> CreateBlogPostInput {
        CreateBlogPostInput {
            slug: slug.to_string(),
            title: "Sailing season".to_string(),
            content: "# Heading\n\nSome **bold** text.".to_string(),
            excerpt: String::new(),
            hero_image: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_renders_markdown() {
        let (service, author_id) = setup().await;
        let post = service.create(input("season"), author_id).await.unwrap();

        assert!(post.content_html.contains("<h1>Heading</h1>"));
        assert!(post.content_html.contains("<strong>bold</strong>"));
        assert_eq!(post.status, PostStatus::Draft);
        assert!(post.published_at.is_none());
    }

    #[tokio::test]
    async fn test_slug_collision_rejected() {
        let (service, author_id) = setup().await;
        service.create(input("season"), author_id).await.unwrap();

        let result = service.create(input("season"), author_id).await;
        assert!(matches!(result, Err(BlogServiceError::SlugTaken(_))));
    }

    #[tokio::test]
    async fn test_first_publish_stamps_published_at() {
        let (service, author_id) = setup().await;
        let post = service.create(input("season"), author_id).await.unwrap();

        let published = service
            .update(
                post.id,
                UpdateBlogPostInput {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(published.published_at.is_some());
        let first_stamp = published.published_at;

        // Unpublish and republish keeps the original stamp
        service
            .update(
                post.id,
                UpdateBlogPostInput {
                    status: Some(PostStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let again = service
            .update(
                post.id,
                UpdateBlogPostInput {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(again.published_at, first_stamp);
    }

    #[tokio::test]
    async fn test_get_published_hides_drafts() {
        let (service, author_id) = setup().await;
        service.create(input("draft-post"), author_id).await.unwrap();

        assert!(service.get_published("draft-post").await.unwrap().is_none());
    }

    #[test]
    fn test_render_markdown_tables() {
        let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }
}
