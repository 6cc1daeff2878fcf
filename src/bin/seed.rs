//! Seed the database with sample data for local development.
//!
//! Creates an admin account (admin / changeme-now), two vessels, an
//! itinerary with a linked package, home-page copy, and a gallery
//! category. Safe to run against an empty database only.

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dahabiyat::{
    cache::MemoryCache,
    config::Config,
    db::{
        self,
        repositories::{
            DahabiyaRepository, GalleryRepository, ItineraryRepository, PackageRepository,
            PartnerRepository, SqlxContentRepository, SqlxDahabiyaRepository,
            SqlxGalleryRepository, SqlxItineraryRepository, SqlxPackageRepository,
            SqlxPartnerRepository, SqlxSessionRepository, SqlxUserRepository, UserRepository,
        },
    },
    models::{
        ContentKind, CreateDahabiyaInput, CreatePackageInput, CreateUserInput,
        GalleryCategoryInput, GalleryImageInput, ItineraryDayInput, ItineraryInput, PartnerInput,
        UpsertContentInput,
    },
    services::{ContentService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,dahabiyat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(Path::new("config.yml"))?;
    let pool = db::create_pool(&config.database).await?;
    db::migrations::run_migrations(&pool).await?;

    let users = SqlxUserRepository::boxed(pool.clone());
    if users.count().await? > 0 {
        bail!("Database already has users; refusing to seed");
    }

    // First registered account becomes admin
    let user_service = UserService::new(users, SqlxSessionRepository::boxed(pool.clone()));
    let admin = user_service
        .register(CreateUserInput {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "changeme-now".to_string(),
            role: None,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin user: {}", e))?;
    tracing::info!(username = %admin.username, "Created admin account");

    // Fleet
    let dahabiyas = SqlxDahabiyaRepository::new(pool.clone());
    let queen = dahabiyas
        .create(&CreateDahabiyaInput {
            slug: "queen-cleopatra".to_string(),
            name: "Queen Cleopatra".to_string(),
            description: "An elegant eight-cabin dahabiya with a shaded sun deck.".to_string(),
            cabins: 8,
            max_guests: 16,
            length_m: Some(52.0),
            price_per_night: 1100.0,
            hero_image: None,
            features: vec![
                "Sun deck".to_string(),
                "Private chef".to_string(),
                "En-suite cabins".to_string(),
            ],
            status: None,
        })
        .await?;
    dahabiyas
        .create(&CreateDahabiyaInput {
            slug: "nile-breeze".to_string(),
            name: "Nile Breeze".to_string(),
            description: "A cosy six-cabin vessel for smaller charters.".to_string(),
            cabins: 6,
            max_guests: 12,
            length_m: Some(44.0),
            price_per_night: 900.0,
            hero_image: None,
            features: vec!["Sun deck".to_string(), "Library lounge".to_string()],
            status: None,
        })
        .await?;
    tracing::info!("Created sample fleet");

    // Itinerary and linked package
    let itineraries = SqlxItineraryRepository::new(pool.clone());
    let classic = itineraries
        .create(&ItineraryInput {
            slug: "esna-to-aswan".to_string(),
            name: "Esna to Aswan".to_string(),
            summary: "Five days sailing the quiet stretch of the Upper Nile.".to_string(),
            days: vec![
                ItineraryDayInput {
                    day_number: 1,
                    title: "Embarkation at Esna".to_string(),
                    description: "Board after the Esna lock and settle in.".to_string(),
                    meals: Some("L, D".to_string()),
                },
                ItineraryDayInput {
                    day_number: 2,
                    title: "El Kab and Edfu".to_string(),
                    description: "Rock tombs at El Kab, sunset at the Temple of Horus."
                        .to_string(),
                    meals: Some("B, L, D".to_string()),
                },
                ItineraryDayInput {
                    day_number: 3,
                    title: "Gebel el-Silsila".to_string(),
                    description: "Sandstone quarries and a swim from the bank.".to_string(),
                    meals: Some("B, L, D".to_string()),
                },
                ItineraryDayInput {
                    day_number: 4,
                    title: "Kom Ombo".to_string(),
                    description: "The double temple of Sobek and Haroeris.".to_string(),
                    meals: Some("B, L, D".to_string()),
                },
                ItineraryDayInput {
                    day_number: 5,
                    title: "Arrival in Aswan".to_string(),
                    description: "Morning arrival and disembarkation.".to_string(),
                    meals: Some("B".to_string()),
                },
            ],
        })
        .await?;

    let packages = SqlxPackageRepository::new(pool.clone());
    packages
        .create(&CreatePackageInput {
            slug: "classic-upper-nile".to_string(),
            name: "Classic Upper Nile".to_string(),
            description: "Our signature five-day sailing, all shore visits included."
                .to_string(),
            duration_days: 5,
            price: 1650.0,
            hero_image: None,
            itinerary_id: Some(classic.id),
            status: None,
        })
        .await?;
    tracing::info!("Created itinerary and package");

    // Home-page copy
    let content = ContentService::new(
        SqlxContentRepository::boxed(pool.clone()),
        Arc::new(MemoryCache::new()),
    );
    let entries = [
        ("home_hero_title", "hero", "Sail the Nile the quiet way"),
        (
            "home_hero_subtitle",
            "hero",
            "Traditional dahabiyas, modern comfort, no crowds",
        ),
        (
            "home_about",
            "about",
            "Our family has sailed this river for three generations.",
        ),
    ];
    for (key, section, value) in entries {
        content
            .upsert(UpsertContentInput {
                key: key.to_string(),
                title: None,
                value: value.to_string(),
                kind: ContentKind::Text,
                page: "home".to_string(),
                section: section.to_string(),
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed content: {}", e))?;
    }
    tracing::info!("Seeded home page copy");

    // Gallery and partners
    let gallery = SqlxGalleryRepository::new(pool.clone());
    let deck = gallery
        .create_category(&GalleryCategoryInput {
            slug: "on-deck".to_string(),
            name: "On Deck".to_string(),
            sort_order: 1,
        })
        .await?;
    gallery
        .add_image(
            deck.id,
            &GalleryImageInput {
                url: "/images/gallery/deck-sunset.jpg".to_string(),
                caption: Some("Sunset north of Kom Ombo".to_string()),
                sort_order: 1,
            },
        )
        .await?;

    let partners = SqlxPartnerRepository::new(pool.clone());
    partners
        .create(&PartnerInput {
            name: "Egyptian Travel Agents Association".to_string(),
            logo_url: "/images/partners/etaa.png".to_string(),
            website_url: None,
            sort_order: 1,
        })
        .await?;

    tracing::info!(vessel = %queen.name, "Seeding complete");
    Ok(())
}
