//! Blog post repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{BlogPost, ListParams, PagedResult, PostStatus};

/// Repository trait for blog post operations
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost>;
    async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    /// List posts, newest first. Public callers pass `published_only`.
    async fn list(
        &self,
        params: &ListParams,
        published_only: bool,
    ) -> Result<PagedResult<BlogPost>>;

    async fn count(&self) -> Result<i64>;

    /// Replace the stored post with the given one (matched by id)
    async fn update(&self, post: &BlogPost) -> Result<BlogPost>;

    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based blog repository
pub struct SqlxBlogRepository {
    pool: DbPool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_post(row: &SqliteRow) -> Result<BlogPost> {
    let status: String = row.get("status");
    Ok(BlogPost {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        content: row.get("content"),
        content_html: row.get("content_html"),
        excerpt: row.get("excerpt"),
        hero_image: row.get("hero_image"),
        author_id: row.get("author_id"),
        status: PostStatus::from_str(&status)?,
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost> {
        let result = sqlx::query(
            "INSERT INTO blog_posts
                 (slug, title, content, content_html, excerpt, hero_image, author_id,
                  status, published_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.content_html)
        .bind(&post.excerpt)
        .bind(&post.hero_image)
        .bind(post.author_id)
        .bind(post.status.to_string())
        .bind(post.published_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert blog post")?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .context("Inserted blog post not found")
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        let row = sqlx::query("SELECT * FROM blog_posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query blog post by id")?;
        row.as_ref().map(row_to_post).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let row = sqlx::query("SELECT * FROM blog_posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query blog post by slug")?;
        row.as_ref().map(row_to_post).transpose()
    }

    async fn list(
        &self,
        params: &ListParams,
        published_only: bool,
    ) -> Result<PagedResult<BlogPost>> {
        let filter = if published_only {
            "WHERE status = 'published'"
        } else {
            ""
        };

        let count_row = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM blog_posts {}",
            filter
        ))
        .fetch_one(&self.pool)
        .await
        .context("Failed to count blog posts")?;
        let total: i64 = count_row.get("count");

        // Published posts order by publication date, drafts by creation
        let order = if published_only {
            "published_at DESC"
        } else {
            "created_at DESC"
        };

        let rows = sqlx::query(&format!(
            "SELECT * FROM blog_posts {} ORDER BY {} LIMIT ? OFFSET ?",
            filter, order
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list blog posts")?;

        let items = rows.iter().map(row_to_post).collect::<Result<Vec<_>>>()?;
        Ok(PagedResult::new(items, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM blog_posts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count blog posts")?;
        Ok(row.get("count"))
    }

    async fn update(&self, post: &BlogPost) -> Result<BlogPost> {
        sqlx::query(
            "UPDATE blog_posts SET
                 slug = ?, title = ?, content = ?, content_html = ?, excerpt = ?,
                 hero_image = ?, status = ?, published_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.content_html)
        .bind(&post.excerpt)
        .bind(&post.hero_image)
        .bind(post.status.to_string())
        .bind(post.published_at)
        .bind(Utc::now())
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update blog post")?;

        self.find_by_id(post.id)
            .await?
            .context("Updated blog post not found")
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete blog post")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::models::{User, UserRole};

    async fn setup() -> (DbPool, i64) {
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
        (pool, author.id)
    }

    fn sample(slug: &str, author_id: i64, status: PostStatus) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: 0,
            slug: slug.to_string(),
            title: slug.to_string(),
            content: "# Hello".to_string(),
            content_html: "<h1>Hello</h1>".to_string(),
            excerpt: String::new(),
            hero_image: None,
            author_id,
            status,
            published_at: (status == PostStatus::Published).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_published_only_listing() {
        let (pool, author_id) = setup().await;
        let repo = SqlxBlogRepository::new(pool);

        repo.create(&sample("draft-post", author_id, PostStatus::Draft))
            .await
            .unwrap();
        repo.create(&sample("live-post", author_id, PostStatus::Published))
            .await
            .unwrap();

        let public = repo.list(&ListParams::default(), true).await.unwrap();
        assert_eq!(public.total, 1);
        assert_eq!(public.items[0].slug, "live-post");

        let all = repo.list(&ListParams::default(), false).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[tokio::test]
    async fn test_update_round_trip() {
        let (pool, author_id) = setup().await;
        let repo = SqlxBlogRepository::new(pool);

        let mut post = repo
            .create(&sample("post", author_id, PostStatus::Draft))
            .await
            .unwrap();
        post.title = "New title".to_string();
        post.status = PostStatus::Published;
        post.published_at = Some(Utc::now());

        let updated = repo.update(&post).await.unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.status, PostStatus::Published);
        assert!(updated.published_at.is_some());
    }
}
