//! Dahabiya API endpoints
//!
//! Public listings show active vessels only; the back office sees and
//! manages the whole fleet.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{
    CreateDahabiyaInput, Dahabiya, PagedResult, Review, UpdateDahabiyaInput,
};

/// Build the public dahabiya router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public))
        .route("/{slug}", get(get_by_slug))
        .route("/{slug}/reviews", get(list_reviews))
}

/// Build the staff dahabiya router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(delete_vessel))
}

/// GET /api/v1/dahabiyas - Active vessels
async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Dahabiya>>, ApiError> {
    Ok(Json(state.dahabiya_repo.list(&query.params(), true).await?))
}

/// GET /api/v1/dahabiyas/{slug} - One vessel by slug
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Dahabiya>, ApiError> {
    let vessel = state
        .dahabiya_repo
        .find_by_slug(&slug)
        .await?
        .filter(|v| v.status == crate::models::VesselStatus::Active)
        .ok_or_else(|| ApiError::not_found("Dahabiya not found"))?;
    Ok(Json(vessel))
}

/// GET /api/v1/dahabiyas/{slug}/reviews - Approved reviews for a vessel
async fn list_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let vessel = state
        .dahabiya_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Dahabiya not found"))?;
    Ok(Json(state.review_repo.list_approved(Some(vessel.id)).await?))
}

/// GET /api/v1/admin/dahabiyas - Whole fleet
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Dahabiya>>, ApiError> {
    Ok(Json(state.dahabiya_repo.list(&query.params(), false).await?))
}

/// GET /api/v1/admin/dahabiyas/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Dahabiya>, ApiError> {
    let vessel = state
        .dahabiya_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Dahabiya not found"))?;
    Ok(Json(vessel))
}

/// POST /api/v1/admin/dahabiyas
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDahabiyaInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if state.dahabiya_repo.find_by_slug(&input.slug).await?.is_some() {
        return Err(ApiError::conflict(format!("Slug already in use: {}", input.slug)));
    }
    let vessel = state.dahabiya_repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(vessel)))
}

/// PUT /api/v1/admin/dahabiyas/{id}
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateDahabiyaInput>,
) -> Result<Json<Dahabiya>, ApiError> {
    let vessel = state
        .dahabiya_repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Dahabiya not found"))?;
    Ok(Json(vessel))
}

/// DELETE /api/v1/admin/dahabiyas/{id}
async fn delete_vessel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.dahabiya_repo.delete(id).await? {
        return Err(ApiError::not_found("Dahabiya not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
