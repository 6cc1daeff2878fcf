//! Booking API endpoints
//!
//! Public creation and reference lookup, customer booking history, and
//! the staff lifecycle operations including the CSV export.

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Booking, BookingStatus, CreateBookingInput, PagedResult, UpdateBookingInput};

/// Query string for the staff booking list
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
}

/// Request body for a status change
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BookingStatus,
}

/// Build the public booking router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::post(create))
        .route("/lookup/{reference}", get(lookup_by_reference))
}

/// Build the customer booking router (requires auth)
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/mine", get(list_mine))
}

/// Build the staff booking router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all))
        .route("/export.csv", get(export_csv))
        .route("/{id}", get(get_by_id).put(update).delete(delete_booking))
        .route("/{id}/status", put(set_status))
}

/// POST /api/v1/bookings - Create a booking
///
/// Works for anonymous guests; a logged-in customer gets the booking
/// attached to their account.
async fn create(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Json(input): Json<CreateBookingInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.map(|Extension(u)| u.0.id);
    let booking = state.booking_service.create(input, user_id).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/bookings/lookup/{reference} - Booking by reference code
async fn lookup_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .booking_service
        .find_by_reference(&reference)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    Ok(Json(booking))
}

/// GET /api/v1/bookings/mine - Current user's bookings
async fn list_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<Booking>>, ApiError> {
    Ok(Json(
        state
            .booking_service
            .list_for_user(user.0.id, &query.params())
            .await?,
    ))
}

/// GET /api/v1/admin/bookings - All bookings, optionally filtered by status
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<PagedResult<Booking>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(BookingStatus::from_str)
        .transpose()
        .map_err(|e| ApiError::validation_error(e.to_string()))?;
    let params = PageQuery {
        page: query.page,
        per_page: query.per_page,
    }
    .params();
    Ok(Json(state.booking_service.list(&params, status).await?))
}

/// GET /api/v1/admin/bookings/{id}
async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .booking_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    Ok(Json(booking))
}

/// PUT /api/v1/admin/bookings/{id} - Edit guest-supplied fields
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateBookingInput>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.booking_service.update(id, &input).await?))
}

/// PUT /api/v1/admin/bookings/{id}/status - Move through the lifecycle
async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Booking>, ApiError> {
    Ok(Json(state.booking_service.set_status(id, body.status).await?))
}

/// DELETE /api/v1/admin/bookings/{id}
async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.booking_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/bookings/export.csv - All bookings as CSV
async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let csv = state.booking_service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    ))
}
