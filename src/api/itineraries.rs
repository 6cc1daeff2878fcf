//! Itinerary API endpoints
//!
//! Itineraries are always written as a whole, days included.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Itinerary, ItineraryInput};

/// Build the public itinerary router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(get_by_slug))
}

/// Build the staff itinerary router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_by_id).put(replace).delete(delete_itinerary))
}

/// GET /api/v1/itineraries - All itineraries with their days
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Itinerary>>, ApiError> {
    Ok(Json(state.itinerary_repo.list().await?))
}

/// GET /api/v1/itineraries/{slug}
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Itinerary>, ApiError> {
    let itinerary = state
        .itinerary_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;
    Ok(Json(itinerary))
}

/// GET /api/v1/admin/itineraries/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Itinerary>, ApiError> {
    let itinerary = state
        .itinerary_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;
    Ok(Json(itinerary))
}

/// POST /api/v1/admin/itineraries
async fn create(
    State(state): State<AppState>,
    Json(input): Json<ItineraryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if state.itinerary_repo.find_by_slug(&input.slug).await?.is_some() {
        return Err(ApiError::conflict(format!("Slug already in use: {}", input.slug)));
    }
    let itinerary = state.itinerary_repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(itinerary)))
}

/// PUT /api/v1/admin/itineraries/{id} - Full replacement, days included
async fn replace(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ItineraryInput>,
) -> Result<Json<Itinerary>, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if let Some(existing) = state.itinerary_repo.find_by_slug(&input.slug).await? {
        if existing.id != id {
            return Err(ApiError::conflict(format!("Slug already in use: {}", input.slug)));
        }
    }
    let itinerary = state
        .itinerary_repo
        .replace(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Itinerary not found"))?;
    Ok(Json(itinerary))
}

/// DELETE /api/v1/admin/itineraries/{id}
async fn delete_itinerary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.itinerary_repo.delete(id).await? {
        return Err(ApiError::not_found("Itinerary not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
