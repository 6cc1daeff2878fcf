//! Admin dashboard and user management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::process;
use sysinfo::{Pid, System};

use crate::api::auth::UserResponse;
use crate::api::common::PageQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::MonthlyRevenue;
use crate::models::{BookingStatus, PagedResult, UserRole, UserStatus};

/// Aggregate counters for the dashboard landing page
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub dahabiyas: i64,
    pub packages: i64,
    pub bookings: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub pending_reviews: i64,
    pub unread_contacts: i64,
    pub unread_notifications: i64,
    pub users: i64,
    pub revenue: Vec<MonthlyRevenue>,
}

/// Process and request statistics
#[derive(Debug, Serialize)]
pub struct SystemStatsResponse {
    pub version: String,
    pub memory_bytes: u64,
    pub memory_formatted: String,
    pub system_total_memory: u64,
    pub system_used_memory: u64,
    pub os_name: String,
    pub uptime_seconds: u64,
    pub uptime_formatted: String,
    pub total_requests: u64,
    pub avg_response_time_ms: f64,
}

/// Request body for changing a user's role or status
#[derive(Debug, Deserialize)]
pub struct SetUserRoleRequest {
    pub role: UserRole,
    pub status: UserStatus,
}

/// Build the admin-only router (dashboard, stats, user management)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/stats", get(get_system_stats))
        .route("/users", get(list_users))
        .route("/users/{id}", put(set_user_role).delete(delete_user))
}

/// GET /api/v1/admin/dashboard - Aggregate counters and revenue series
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    Ok(Json(DashboardResponse {
        dahabiyas: state.dahabiya_repo.count().await?,
        packages: state.package_repo.count().await?,
        bookings: state.booking_repo.count().await?,
        pending_bookings: state
            .booking_repo
            .count_by_status(BookingStatus::Pending)
            .await?,
        confirmed_bookings: state
            .booking_repo
            .count_by_status(BookingStatus::Confirmed)
            .await?,
        pending_reviews: state.review_repo.count_pending().await?,
        unread_contacts: state.contact_repo.count_unread().await?,
        unread_notifications: state.notification_repo.count_unread().await?,
        users: state.user_repo.count().await?,
        revenue: state.booking_service.revenue_report().await?,
    }))
}

/// GET /api/v1/admin/stats - Process, memory, and request statistics
async fn get_system_stats(
    State(state): State<AppState>,
) -> Result<Json<SystemStatsResponse>, ApiError> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let pid = Pid::from_u32(process::id());
    let memory_bytes = sys.process(pid).map(|p| p.memory()).unwrap_or(0);

    let uptime_seconds = state.request_stats.uptime_seconds();

    Ok(Json(SystemStatsResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        memory_formatted: format_bytes(memory_bytes),
        memory_bytes,
        system_total_memory: sys.total_memory(),
        system_used_memory: sys.used_memory(),
        os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
        uptime_formatted: format_uptime(uptime_seconds),
        uptime_seconds,
        total_requests: state.request_stats.total_requests(),
        avg_response_time_ms: state.request_stats.avg_response_time_us() / 1000.0,
    }))
}

/// GET /api/v1/admin/users - All accounts, newest first
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResult<UserResponse>>, ApiError> {
    let users = state.user_repo.list(&query.params()).await?;
    Ok(Json(users.map(UserResponse::from)))
}

/// PUT /api/v1/admin/users/{id} - Change role or status
///
/// Admins cannot demote or disable their own account.
async fn set_user_role(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<SetUserRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if admin.0.id == id && (body.role != UserRole::Admin || body.status != UserStatus::Active) {
        return Err(ApiError::validation_error(
            "Cannot demote or disable your own account",
        ));
    }
    if state.user_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    state
        .user_repo
        .update_role_status(id, body.role, body.status)
        .await?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// DELETE /api/v1/admin/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if admin.0.id == id {
        return Err(ApiError::validation_error("Cannot delete your own account"));
    }
    if state.user_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    state.user_repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Format uptime to a short human readable string
fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}

/// Format bytes to a human readable string
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(130), "2m");
        assert_eq!(format_uptime(3700), "1h 1m");
        assert_eq!(format_uptime(90061), "1d 1h 1m");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }
}
