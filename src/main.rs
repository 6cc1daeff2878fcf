//! Dahabiyat - content and booking backend for a Nile cruise operator

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dahabiyat::{
    api::{self, AppState, RequestStats},
    cache::MemoryCache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxBlogRepository, SqlxBookingRepository, SqlxContactRepository,
            SqlxContentRepository, SqlxDahabiyaRepository, SqlxGalleryRepository,
            SqlxItineraryRepository, SqlxMediaRepository, SqlxNotificationRepository,
            SqlxPackageRepository, SqlxPartnerRepository, SqlxReviewRepository,
            SqlxSessionRepository, SqlxUserRepository,
        },
    },
    services::{BlogService, BookingService, ContentService, EmailService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dahabiyat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dahabiyat backend...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database ready: {}", config.database.url);

    let cache = Arc::new(MemoryCache::with_capacity_and_ttl(
        config.cache.max_entries,
        std::time::Duration::from_secs(config.cache.ttl_seconds),
    ));

    // Repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let content_repo = SqlxContentRepository::boxed(pool.clone());
    let dahabiya_repo = SqlxDahabiyaRepository::boxed(pool.clone());
    let package_repo = SqlxPackageRepository::boxed(pool.clone());
    let itinerary_repo = SqlxItineraryRepository::boxed(pool.clone());
    let booking_repo = SqlxBookingRepository::boxed(pool.clone());
    let blog_repo = SqlxBlogRepository::boxed(pool.clone());
    let review_repo = SqlxReviewRepository::boxed(pool.clone());
    let contact_repo = SqlxContactRepository::boxed(pool.clone());
    let media_repo = SqlxMediaRepository::boxed(pool.clone());
    let gallery_repo = SqlxGalleryRepository::boxed(pool.clone());
    let partner_repo = SqlxPartnerRepository::boxed(pool.clone());
    let notification_repo = SqlxNotificationRepository::boxed(pool.clone());

    // Services
    let user_service = Arc::new(UserService::new(user_repo.clone(), session_repo));
    let content_service = Arc::new(ContentService::new(content_repo, cache.clone()));
    let email_service = Arc::new(EmailService::new(content_service.clone()));
    let booking_service = Arc::new(BookingService::new(
        booking_repo.clone(),
        dahabiya_repo.clone(),
        package_repo.clone(),
        notification_repo.clone(),
        email_service.clone(),
    ));
    let blog_service = Arc::new(BlogService::new(blog_repo));

    let state = AppState {
        pool: pool.clone(),
        user_service: user_service.clone(),
        content_service,
        booking_service,
        blog_service,
        email_service,
        dahabiya_repo,
        package_repo,
        itinerary_repo,
        review_repo,
        contact_repo,
        media_repo,
        gallery_repo,
        partner_repo,
        notification_repo,
        user_repo,
        booking_repo,
        upload_config: Arc::new(config.upload.clone()),
        request_stats: Arc::new(RequestStats::new()),
    };

    // Expired sessions get swept hourly
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match user_service.cleanup_sessions().await {
                    Ok(removed) if removed > 0 => {
                        tracing::info!(removed, "Cleaned up expired sessions");
                    }
                    Ok(_) => {}
                    Err(error) => tracing::warn!(%error, "Session cleanup failed"),
                }
            }
        });
    }

    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
