//! API middleware
//!
//! Session authentication, role checks, the shared application state, and
//! the JSON error envelope returned by every handler.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::models::User;
use crate::services::{
    BlogService, BookingService, BookingServiceError, ContentService, ContentServiceError,
    EmailService, UserService, UserServiceError,
};

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    total_requests: AtomicU64,
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.total_response_time_us.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DbPool,
    pub user_service: Arc<UserService>,
    pub content_service: Arc<ContentService>,
    pub booking_service: Arc<BookingService>,
    pub blog_service: Arc<BlogService>,
    pub email_service: Arc<EmailService>,
    pub dahabiya_repo: Arc<dyn crate::db::repositories::DahabiyaRepository>,
    pub package_repo: Arc<dyn crate::db::repositories::PackageRepository>,
    pub itinerary_repo: Arc<dyn crate::db::repositories::ItineraryRepository>,
    pub review_repo: Arc<dyn crate::db::repositories::ReviewRepository>,
    pub contact_repo: Arc<dyn crate::db::repositories::ContactRepository>,
    pub media_repo: Arc<dyn crate::db::repositories::MediaRepository>,
    pub gallery_repo: Arc<dyn crate::db::repositories::GalleryRepository>,
    pub partner_repo: Arc<dyn crate::db::repositories::PartnerRepository>,
    pub notification_repo: Arc<dyn crate::db::repositories::NotificationRepository>,
    pub user_repo: Arc<dyn crate::db::repositories::UserRepository>,
    pub booking_repo: Arc<dyn crate::db::repositories::BookingRepository>,
    pub upload_config: Arc<crate::config::UploadConfig>,
    pub request_stats: Arc<RequestStats>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        match error {
            UserServiceError::AuthenticationFailed => {
                ApiError::unauthorized("Invalid credentials")
            }
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(what) => {
                ApiError::conflict(format!("Already taken: {}", what))
            }
            UserServiceError::SessionInvalid => {
                ApiError::unauthorized("Invalid or expired session")
            }
            UserServiceError::Internal(error) => {
                tracing::error!(%error, "User service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<ContentServiceError> for ApiError {
    fn from(error: ContentServiceError) -> Self {
        match error {
            ContentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ContentServiceError::NotFound(key) => {
                ApiError::not_found(format!("Content entry not found: {}", key))
            }
            ContentServiceError::Internal(error) => {
                tracing::error!(%error, "Content service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<BookingServiceError> for ApiError {
    fn from(error: BookingServiceError) -> Self {
        match error {
            BookingServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BookingServiceError::NotFound => ApiError::not_found("Booking not found"),
            BookingServiceError::UnknownTarget(what) => {
                ApiError::validation_error(format!("Unknown booking target: {}", what))
            }
            BookingServiceError::InvalidTransition { from, to } => {
                ApiError::conflict(format!("Cannot move booking from {} to {}", from, to))
            }
            BookingServiceError::Internal(error) => {
                tracing::error!(%error, "Booking service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<crate::services::blog::BlogServiceError> for ApiError {
    fn from(error: crate::services::blog::BlogServiceError) -> Self {
        use crate::services::blog::BlogServiceError;
        match error {
            BlogServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            BlogServiceError::NotFound => ApiError::not_found("Post not found"),
            BlogServiceError::SlugTaken(slug) => {
                ApiError::conflict(format!("Slug already in use: {}", slug))
            }
            BlogServiceError::Internal(error) => {
                tracing::error!(%error, "Blog service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        tracing::error!(%error, "Unhandled internal error");
        ApiError::internal_error("Internal server error")
    }
}

/// Extract session token from Authorization bearer or session cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state.user_service.validate_session(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Authentication middleware that tolerates anonymous requests. A valid
/// session attaches the user; anything else passes through untouched.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(&request) {
        if let Ok(user) = state.user_service.validate_session(&token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}

/// Staff authorization middleware (admin or staff role)
pub async fn require_staff(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_staff() {
        return Err(ApiError::forbidden("Staff privileges required"));
    }

    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Request statistics middleware
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state.request_stats.record(start.elapsed().as_micros() as u64);
    response
}

/// Build Cache-Control header for public API responses
pub fn cache_control_api(max_age: u32, stale_while_revalidate: Option<u32>) -> String {
    match stale_while_revalidate {
        Some(swr) => format!(
            "public, max-age={}, stale-while-revalidate={}",
            max_age, swr
        ),
        None => format!("public, max-age={}", max_age),
    }
}

/// Middleware adding cache headers to successful public responses
pub async fn add_api_cache_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.status().is_success() {
        if let Ok(value) = cache_control_api(300, Some(3600)).parse() {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_extract_session_token_from_bearer() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, "theme=dark; session=token-456")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-456".to_string()));
    }

    #[test]
    fn test_bearer_takes_priority_over_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_no_token() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::not_found("x").error.code, "NOT_FOUND");
        assert_eq!(ApiError::validation_error("x").error.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_cache_control_api() {
        assert_eq!(
            cache_control_api(300, Some(3600)),
            "public, max-age=300, stale-while-revalidate=3600"
        );
        assert_eq!(cache_control_api(60, None), "public, max-age=60");
    }

    #[test]
    fn test_request_stats() {
        let stats = RequestStats::new();
        assert_eq!(stats.total_requests(), 0);
        assert_eq!(stats.avg_response_time_us(), 0.0);

        stats.record(100);
        stats.record(300);
        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.avg_response_time_us(), 200.0);
    }
}
