//! Blog API endpoints
//!
//! Public readers only ever see published posts; drafts live in the back
//! office until published.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{BlogPost, CreateBlogPostInput, PagedResult, UpdateBlogPostInput};

/// Build the public blog router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/{slug}", get(get_published))
}

/// Build the staff blog router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(delete_post))
}

/// GET /api/v1/blog - Published posts, newest first
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<BlogPost>>, ApiError> {
    Ok(Json(state.blog_service.list(&query.params(), true).await?))
}

/// GET /api/v1/blog/{slug} - One published post
async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state
        .blog_service
        .get_published(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

/// GET /api/v1/admin/blog - All posts including drafts
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<BlogPost>>, ApiError> {
    Ok(Json(state.blog_service.list(&query.params(), false).await?))
}

/// GET /api/v1/admin/blog/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, ApiError> {
    let post = state
        .blog_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

/// POST /api/v1/admin/blog - Create a post authored by the current user
async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateBlogPostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.blog_service.create(input, user.0.id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/admin/blog/{id}
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBlogPostInput>,
) -> Result<Json<BlogPost>, ApiError> {
    Ok(Json(state.blog_service.update(id, input).await?))
}

/// DELETE /api/v1/admin/blog/{id}
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.blog_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
