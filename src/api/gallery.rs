//! Gallery API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{GalleryCategory, GalleryCategoryInput, GalleryImage, GalleryImageInput};

/// Build the public gallery router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{slug}", get(get_category))
}

/// Build the staff gallery router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", axum::routing::put(update_category).delete(delete_category))
        .route("/{id}/images", axum::routing::post(add_image))
        .route("/images/{id}", axum::routing::delete(delete_image))
}

/// GET /api/v1/gallery - Categories with their images
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryCategory>>, ApiError> {
    Ok(Json(state.gallery_repo.list_categories().await?))
}

/// GET /api/v1/gallery/{slug} - One category with its images
async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GalleryCategory>, ApiError> {
    let category = state
        .gallery_repo
        .find_category_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Gallery category not found"))?;
    Ok(Json(category))
}

/// POST /api/v1/admin/gallery
async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<GalleryCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if state
        .gallery_repo
        .find_category_by_slug(&input.slug)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!("Slug already in use: {}", input.slug)));
    }
    let category = state.gallery_repo.create_category(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/v1/admin/gallery/{id}
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<GalleryCategoryInput>,
) -> Result<Json<GalleryCategory>, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let category = state
        .gallery_repo
        .update_category(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Gallery category not found"))?;
    Ok(Json(category))
}

/// DELETE /api/v1/admin/gallery/{id} - Removes the category and its images
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.gallery_repo.delete_category(id).await? {
        return Err(ApiError::not_found("Gallery category not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/gallery/{id}/images
async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<GalleryImageInput>,
) -> Result<(StatusCode, Json<GalleryImage>), ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let image = state.gallery_repo.add_image(id, &input).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// DELETE /api/v1/admin/gallery/images/{id}
async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.gallery_repo.delete_image(id).await? {
        return Err(ApiError::not_found("Gallery image not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
