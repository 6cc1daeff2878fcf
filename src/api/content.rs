//! Website content API endpoints
//!
//! Public reads for page copy, site info, and the resolved logo; staff
//! writes for the key-value editor in the back office.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::{ContentEntry, PageContent, UpsertContentInput};
use crate::services::content::{content_keys, ResolvedLogo};

/// Public site information
#[derive(Debug, Serialize)]
pub struct SiteInfoResponse {
    pub version: String,
    pub site_name: String,
    pub site_description: String,
    pub footer_text: String,
    pub logo: ResolvedLogo,
}

/// Build the public content router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/info", get(get_site_info))
        .route("/logo", get(get_logo))
        .route("/pages/{page}", get(get_page))
        .route("/{key}", get(get_entry))
}

/// Build the staff content router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(upsert))
        .route("/pages", get(list_pages))
        .route("/{key}", delete(delete_entry))
}

/// GET /api/v1/content/info - Public site information
async fn get_site_info(State(state): State<AppState>) -> Result<Json<SiteInfoResponse>, ApiError> {
    let content = &state.content_service;
    Ok(Json(SiteInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        site_name: content
            .get_value_or(content_keys::SITE_NAME, "Dahabiyat Nile Cruises")
            .await,
        site_description: content
            .get_value_or(content_keys::SITE_DESCRIPTION, "")
            .await,
        footer_text: content.get_value_or(content_keys::FOOTER_TEXT, "").await,
        logo: content.resolve_logo().await?,
    }))
}

/// GET /api/v1/content/logo - Resolved site logo
async fn get_logo(State(state): State<AppState>) -> Result<Json<ResolvedLogo>, ApiError> {
    Ok(Json(state.content_service.resolve_logo().await?))
}

/// GET /api/v1/content/pages/{page} - Page copy grouped by section
async fn get_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Json<PageContent>, ApiError> {
    Ok(Json(state.content_service.get_page(&page).await?))
}

/// GET /api/v1/content/{key} - Single entry lookup
async fn get_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContentEntry>, ApiError> {
    state
        .content_service
        .get_resolved(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Content entry not found"))
}

/// GET /api/v1/admin/content - Every entry in the store
async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<ContentEntry>>, ApiError> {
    Ok(Json(state.content_service.get_all().await?))
}

/// GET /api/v1/admin/content/pages - Distinct page names
async fn list_pages(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.content_service.list_pages().await?))
}

/// POST /api/v1/admin/content - Create or overwrite an entry
async fn upsert(
    State(state): State<AppState>,
    Json(input): Json<UpsertContentInput>,
) -> Result<Json<ContentEntry>, ApiError> {
    Ok(Json(state.content_service.upsert(input).await?))
}

/// DELETE /api/v1/admin/content/{key} - Remove an entry
async fn delete_entry(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.content_service.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
