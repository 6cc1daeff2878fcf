//! Cruise package API endpoints

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
    CreatePackageInput, Itinerary, Package, PagedResult, UpdatePackageInput, VesselStatus,
};

/// Public view of a package with its linked itinerary hydrated
#[derive(Debug, serde::Serialize)]
pub struct PackageDetail {
    #[serde(flatten)]
    pub package: Package,
    pub itinerary: Option<Itinerary>,
}

/// Build the public package router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public))
        .route("/{slug}", get(get_by_slug))
}

/// Build the staff package router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/{id}", get(get_by_id).put(update).delete(delete_package))
}

/// GET /api/v1/packages - Active packages
async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Package>>, ApiError> {
    Ok(Json(state.package_repo.list(&query.params(), true).await?))
}

/// GET /api/v1/packages/{slug} - One package with its itinerary
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PackageDetail>, ApiError> {
    let package = state
        .package_repo
        .find_by_slug(&slug)
        .await?
        .filter(|p| p.status == VesselStatus::Active)
        .ok_or_else(|| ApiError::not_found("Package not found"))?;

    let itinerary = match package.itinerary_id {
        Some(id) => state.itinerary_repo.find_by_id(id).await?,
        None => None,
    };
    Ok(Json(PackageDetail { package, itinerary }))
}

/// GET /api/v1/admin/packages - All packages
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Package>>, ApiError> {
    Ok(Json(state.package_repo.list(&query.params(), false).await?))
}

/// GET /api/v1/admin/packages/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Package>, ApiError> {
    let package = state
        .package_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Package not found"))?;
    Ok(Json(package))
}

/// POST /api/v1/admin/packages
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePackageInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    if state.package_repo.find_by_slug(&input.slug).await?.is_some() {
        return Err(ApiError::conflict(format!("Slug already in use: {}", input.slug)));
    }
    if let Some(itinerary_id) = input.itinerary_id {
        if state.itinerary_repo.find_by_id(itinerary_id).await?.is_none() {
            return Err(ApiError::validation_error("Linked itinerary does not exist"));
        }
    }
    let package = state.package_repo.create(&input).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

/// PUT /api/v1/admin/packages/{id}
///
/// `itinerary_id: null` clears the link; omitting the field keeps it.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePackageInput>,
) -> Result<Json<Package>, ApiError> {
    if let Some(Some(itinerary_id)) = input.itinerary_id {
        if state.itinerary_repo.find_by_id(itinerary_id).await?.is_none() {
            return Err(ApiError::validation_error("Linked itinerary does not exist"));
        }
    }
    let package = state
        .package_repo
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Package not found"))?;
    Ok(Json(package))
}

/// DELETE /api/v1/admin/packages/{id}
async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.package_repo.delete(id).await? {
        return Err(ApiError::not_found("Package not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
