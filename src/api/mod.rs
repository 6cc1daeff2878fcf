//! API layer - HTTP handlers and routing
//!
//! Route map:
//! - `/api/v1/...` public marketing-site and mobile endpoints
//! - `/api/v1/auth/...` registration, login, account operations
//! - `/api/v1/admin/...` back office (staff role; user management and
//!   dashboard need admin)
//! - `/uploads/...` static media files

pub mod admin;
pub mod auth;
pub mod blog;
pub mod bookings;
pub mod common;
pub mod contacts;
pub mod content;
pub mod dahabiyas;
pub mod gallery;
pub mod itineraries;
pub mod media;
pub mod middleware;
pub mod notifications;
pub mod packages;
pub mod partners;
pub mod reviews;
pub mod upload;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin-only routes (dashboard, stats, user management)
    let admin_only = admin::router()
        .route_layer(axum_middleware::from_fn(middleware::require_admin));

    // Staff routes (back office)
    let staff_routes = Router::new()
        .nest("/content", content::admin_router())
        .nest("/dahabiyas", dahabiyas::admin_router())
        .nest("/packages", packages::admin_router())
        .nest("/itineraries", itineraries::admin_router())
        .nest("/bookings", bookings::admin_router())
        .nest("/blog", blog::admin_router())
        .nest("/reviews", reviews::admin_router())
        .nest("/contacts", contacts::admin_router())
        .nest("/gallery", gallery::admin_router())
        .nest("/partners", partners::admin_router())
        .nest("/media", media::admin_router())
        .nest("/notifications", notifications::admin_router())
        .nest("/upload", upload::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_staff));

    let back_office = Router::new()
        .nest("/admin", staff_routes.merge(admin_only))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Authenticated customer routes
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/bookings", bookings::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public booking creation links the booking to a logged-in customer
    // when a session is present
    let booking_routes = bookings::public_router().route_layer(
        axum_middleware::from_fn_with_state(state.clone(), middleware::optional_auth),
    );

    // Cached public reads
    let cached_public = Router::new()
        .nest("/content", content::public_router())
        .nest("/dahabiyas", dahabiyas::public_router())
        .nest("/packages", packages::public_router())
        .nest("/itineraries", itineraries::public_router())
        .nest("/blog", blog::public_router())
        .nest("/gallery", gallery::public_router())
        .nest("/partners", partners::public_router())
        .route_layer(axum_middleware::from_fn(middleware::add_api_cache_headers));

    Router::new()
        .merge(cached_public)
        .nest("/auth", auth::public_router())
        .nest("/bookings", booking_routes)
        .nest("/reviews", reviews::public_router())
        .nest("/contact", contacts::public_router())
        .merge(back_office)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    let uploads_dir = state.upload_config.path.clone();

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        // Request stats middleware (outermost layer, runs for all requests)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::UploadConfig;
    use crate::db::create_test_pool;
    use crate::db::repositories::{
        DahabiyaRepository, SqlxBlogRepository, SqlxBookingRepository, SqlxContactRepository,
        SqlxContentRepository, SqlxDahabiyaRepository, SqlxGalleryRepository,
        SqlxItineraryRepository, SqlxMediaRepository, SqlxNotificationRepository,
        SqlxPackageRepository, SqlxPartnerRepository, SqlxReviewRepository,
        SqlxSessionRepository, SqlxUserRepository,
    };
    use crate::models::CreateDahabiyaInput;
    use crate::services::{BlogService, BookingService, ContentService, EmailService, UserService};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    async fn test_server() -> (TestServer, AppState) {
        let pool = create_test_pool().await.unwrap();
        let cache = Arc::new(MemoryCache::new());

        let user_service = Arc::new(UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        ));
        let content_service = Arc::new(ContentService::new(
            SqlxContentRepository::boxed(pool.clone()),
            cache,
        ));
        let email_service = Arc::new(EmailService::new(content_service.clone()));
        let booking_service = Arc::new(BookingService::new(
            SqlxBookingRepository::boxed(pool.clone()),
            SqlxDahabiyaRepository::boxed(pool.clone()),
            SqlxPackageRepository::boxed(pool.clone()),
            SqlxNotificationRepository::boxed(pool.clone()),
            email_service.clone(),
        ));
        let blog_service = Arc::new(BlogService::new(SqlxBlogRepository::boxed(pool.clone())));

        let state = AppState {
            pool: pool.clone(),
            user_service,
            content_service,
            booking_service,
            blog_service,
            email_service,
            dahabiya_repo: SqlxDahabiyaRepository::boxed(pool.clone()),
            package_repo: SqlxPackageRepository::boxed(pool.clone()),
            itinerary_repo: SqlxItineraryRepository::boxed(pool.clone()),
            review_repo: SqlxReviewRepository::boxed(pool.clone()),
            contact_repo: SqlxContactRepository::boxed(pool.clone()),
            media_repo: SqlxMediaRepository::boxed(pool.clone()),
            gallery_repo: SqlxGalleryRepository::boxed(pool.clone()),
            partner_repo: SqlxPartnerRepository::boxed(pool.clone()),
            notification_repo: SqlxNotificationRepository::boxed(pool.clone()),
            user_repo: SqlxUserRepository::boxed(pool.clone()),
            booking_repo: SqlxBookingRepository::boxed(pool.clone()),
            upload_config: Arc::new(UploadConfig::default()),
            request_stats: Arc::new(RequestStats::new()),
        };

        let server = TestServer::new(build_router(state.clone(), "http://localhost:3000"))
            .expect("test server");
        (server, state)
    }

    async fn register(server: &TestServer, username: &str) -> (String, String) {
        let response = server
            .post("/api/v1/auth/register")
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret-password",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["role"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_first_registered_user_is_admin_over_http() {
        let (server, _state) = test_server().await;

        let (_, first_role) = register(&server, "founder").await;
        assert_eq!(first_role, "admin");

        let (_, second_role) = register(&server, "guest").await;
        assert_eq!(second_role, "customer");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_anonymous_and_customers() {
        let (server, _state) = test_server().await;
        register(&server, "founder").await;
        let (customer_token, _) = register(&server, "guest").await;

        let anonymous = server.get("/api/v1/admin/dashboard").await;
        assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

        let customer = server
            .get("/api/v1/admin/dashboard")
            .authorization_bearer(&customer_token)
            .await;
        assert_eq!(customer.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_content_upsert_is_visible_on_public_page() {
        let (server, _state) = test_server().await;
        let (admin_token, _) = register(&server, "founder").await;

        let upsert = server
            .post("/api/v1/admin/content")
            .authorization_bearer(&admin_token)
            .json(&serde_json::json!({
                "key": "home_hero_title",
                "value": "Sail the quiet Nile",
                "kind": "text",
                "page": "home",
                "section": "hero",
            }))
            .await;
        assert_eq!(upsert.status_code(), StatusCode::OK);

        let page = server.get("/api/v1/content/pages/home").await;
        assert_eq!(page.status_code(), StatusCode::OK);
        let body: serde_json::Value = page.json();
        assert_eq!(
            body["sections"]["hero"][0]["value"],
            "Sail the quiet Nile"
        );
    }

    #[tokio::test]
    async fn test_site_info_carries_seeded_name_and_logo() {
        let (server, _state) = test_server().await;

        let response = server.get("/api/v1/content/info").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["site_name"], "Dahabiyat Nile Cruises");
        assert!(body["logo"]["url"].as_str().unwrap().contains("/images/logo.png"));
    }

    #[tokio::test]
    async fn test_booking_create_and_reference_lookup() {
        let (server, state) = test_server().await;
        let vessel = state
            .dahabiya_repo
            .create(&CreateDahabiyaInput {
                slug: "queen".to_string(),
                name: "Queen".to_string(),
                description: String::new(),
                cabins: 6,
                max_guests: 12,
                length_m: None,
                price_per_night: 900.0,
                hero_image: None,
                features: vec![],
                status: None,
            })
            .await
            .unwrap();

        let created = server
            .post("/api/v1/bookings")
            .json(&serde_json::json!({
                "dahabiya_id": vessel.id,
                "guest_name": "Guest",
                "email": "guest@example.com",
                "start_date": "2026-10-01",
                "end_date": "2026-10-05",
                "guests": 2,
            }))
            .await;
        assert_eq!(created.status_code(), StatusCode::CREATED);
        let booking: serde_json::Value = created.json();
        let reference = booking["reference"].as_str().unwrap();
        assert!(reference.starts_with("DHB-"));
        assert_eq!(booking["total_price"], 3600.0);

        let lookup = server
            .get(&format!("/api/v1/bookings/lookup/{}", reference))
            .await;
        assert_eq!(lookup.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_csv_export_has_csv_content_type() {
        let (server, _state) = test_server().await;
        let (admin_token, _) = register(&server, "founder").await;

        let response = server
            .get("/api/v1/admin/bookings/export.csv")
            .authorization_bearer(&admin_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert!(content_type.starts_with("text/csv"));
        assert!(response.text().starts_with("reference,guest_name"));
    }

    #[tokio::test]
    async fn test_unknown_content_page_is_empty_not_404() {
        let (server, _state) = test_server().await;

        let response = server.get("/api/v1/content/pages/no-such-page").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert!(body["sections"].as_object().unwrap().is_empty());
    }
}
