//! Contact message API endpoints
//!
//! The public form submission follows the same fan-out rule as bookings:
//! the row must land, the staff notifications are best effort.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{ContactMessage, CreateContactInput, PagedResult};

/// Query string for the staff inbox
#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}

/// Request body for marking a message read or unread
#[derive(Debug, Deserialize)]
pub struct SetReadRequest {
    pub read: bool,
}

/// Build the public contact router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", axum::routing::post(submit))
}

/// Build the staff contact router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(get_by_id).delete(delete_message))
        .route("/{id}/read", put(set_read))
}

/// POST /api/v1/contact - Submit a message from the contact form
async fn submit(
    State(state): State<AppState>,
    Json(input): Json<CreateContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    validator::Validate::validate(&input)
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let message = state.contact_repo.create(&input).await?;

    let title = format!("New contact message from {}", message.name);
    let body = format!("{}\n\n{}", message.subject, message.message);
    if let Err(error) = state
        .notification_repo
        .create("contact", &title, &body)
        .await
    {
        tracing::error!(%error, "Failed to record contact notification");
    }
    if let Err(error) = state.email_service.notify_staff(&title, &body).await {
        tracing::warn!(%error, "Contact notification email not sent");
    }

    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/v1/admin/contacts - Staff inbox
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> Result<Json<PagedResult<ContactMessage>>, ApiError> {
    let params = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .params();
    Ok(Json(state.contact_repo.list(&params, query.unread_only).await?))
}

/// GET /api/v1/admin/contacts/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContactMessage>, ApiError> {
    let message = state
        .contact_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;
    Ok(Json(message))
}

/// PUT /api/v1/admin/contacts/{id}/read - Toggle the read flag
async fn set_read(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.contact_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Message not found"));
    }
    state.contact_repo.set_read(id, body.read).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/contacts/{id}
async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.contact_repo.delete(id).await? {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
