//! Notification API endpoints
//!
//! The back-office bell: rows created by the booking and contact fan-outs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Notification, PagedResult};

/// Unread counter for the bell badge
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Build the staff notification router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread", get(count_unread))
        .route("/read-all", put(mark_all_read))
        .route("/{id}/read", put(mark_read))
}

/// GET /api/v1/admin/notifications - Newest first
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Notification>>, ApiError> {
    Ok(Json(state.notification_repo.list(&query.params()).await?))
}

/// GET /api/v1/admin/notifications/unread
async fn count_unread(
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    Ok(Json(UnreadCountResponse {
        unread: state.notification_repo.count_unread().await?,
    }))
}

/// PUT /api/v1/admin/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.notification_repo.mark_read(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/notifications/read-all
async fn mark_all_read(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.notification_repo.mark_all_read().await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
