//! Partner API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Partner, PartnerInput};

/// Build the public partner router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

/// Build the staff partner router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", axum::routing::put(update).delete(delete_partner))
}

/// GET /api/v1/partners - Footer partner strip, in sort order
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Partner>>, ApiError> {
    Ok(Json(state.partner_repo.list().await?))
}

/// POST /api/v1/admin/partners
async fn create(
    State(state): State<AppState>,
    Json(input): Json<PartnerInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let partner = state.partner_repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(partner)))
}

/// PUT /api/v1/admin/partners/{id}
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PartnerInput>,
) -> Result<Json<Partner>, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let partner = state
        .partner_repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;
    Ok(Json(partner))
}

/// DELETE /api/v1/admin/partners/{id}
async fn delete_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.partner_repo.delete(id).await? {
        return Err(ApiError::not_found("Partner not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
