//! Media library API endpoints
//!
//! Listing and housekeeping for uploaded files. Deleting an asset also
//! removes the file from the upload directory.

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
use crate::models::{MediaAsset, MediaKind, PagedResult};

/// Query string for the media list
#[derive(Debug, Default, Deserialize)]
pub struct MediaListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub kind: Option<String>,
}

/// Request body for updating alt text
#[derive(Debug, Deserialize)]
pub struct SetAltRequest {
    pub alt: Option<String>,
}

/// Build the staff media router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_by_id).delete(delete_asset))
        .route("/{id}/alt", put(set_alt))
}

/// GET /api/v1/admin/media - Media library, optionally filtered by kind
async fn list(
    State(state): State<AppState>,
    Query(query): Query<MediaListQuery>,
) -> Result<Json<PagedResult<MediaAsset>>, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .map(MediaKind::from_str)
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let params = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .params();
    Ok(Json(state.media_repo.list(&params, kind).await?))
}

/// GET /api/v1/admin/media/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MediaAsset>, ApiError> {
    let asset = state
        .media_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media asset not found"))?;
    Ok(Json(asset))
}

/// PUT /api/v1/admin/media/{id}/alt
async fn set_alt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetAltRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.media_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Media asset not found"));
    }
    state.media_repo.set_alt(id, body.alt.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/media/{id} - Removes the row and the file
async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let asset = state
        .media_repo
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Media asset not found"))?;

    let file_path = state.upload_config.path.join(&asset.filename);
    if let Err(error) = tokio::fs::remove_file(&file_path).await {
        // The row is gone either way; an already-missing file is fine
        tracing::warn!(%error, path = %file_path.display(), "Failed to remove media file");
    }

    Ok(StatusCode::NO_CONTENT)
}
