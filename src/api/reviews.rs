//! Review API endpoints
//!
//! Submissions land in the moderation queue; only approved reviews ever
//! reach the public site (served from the dahabiya routes).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateReviewInput, PagedResult, Review, ReviewStatus};

/// Query string for the moderation list
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
}

/// Request body for a moderation decision
#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub status: ReviewStatus,
}

/// Query string for the public approved listing
#[derive(Debug, Default, Deserialize)]
pub struct ApprovedReviewsQuery {
    pub dahabiya_id: Option<i64>,
}

/// Build the public review router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_approved).post(submit))
}

/// Build the staff review router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/status", put(moderate))
        .route("/{id}", axum::routing::delete(delete_review))
}

/// GET /api/v1/reviews - Approved reviews, optionally for one dahabiya
async fn list_approved(
    State(state): State<AppState>,
    Query(query): Query<ApprovedReviewsQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(state.review_repo.list_approved(query.dahabiya_id).await?))
}

/// POST /api/v1/reviews - Submit a review (starts pending)
async fn submit(
    State(state): State<AppState>,
    Json(input): Json<CreateReviewInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if let Some(dahabiya_id) = input.dahabiya_id {
        if state.dahabiya_repo.find_by_id(dahabiya_id).await?.is_none() {
            return Err(ApiError::validation_error("Reviewed dahabiya does not exist"));
        }
    }
    let review = state.review_repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/admin/reviews - Moderation list
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<PagedResult<Review>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(ReviewStatus::from_str)
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let params = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .params();
    Ok(Json(state.review_repo.list(&params, status).await?))
}

/// PUT /api/v1/admin/reviews/{id}/status - Approve or reject
async fn moderate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ModerateRequest>,
) -> Result<Json<Review>, ApiError> {
    if state.review_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Review not found"));
    }
    state.review_repo.set_status(id, body.status).await?;
    let review = state
        .review_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    Ok(Json(review))
}

/// DELETE /api/v1/admin/reviews/{id}
async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.review_repo.delete(id).await? {
        return Err(ApiError::not_found("Review not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
