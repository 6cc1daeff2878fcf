//! Database migrations
//!
//! Code-based migrations embedded in the binary as SQL strings, applied in
//! version order. Applied versions are recorded in `schema_migrations` so a
//! restart only runs what is new.

use anyhow::{Context, Result};
use sqlx::Row;

use super::DbPool;

/// A single schema migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// All migrations for the Dahabiyat system.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'customer',
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_dahabiyas",
        up: r#"
            CREATE TABLE IF NOT EXISTS dahabiyas (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                cabins INTEGER NOT NULL DEFAULT 0,
                max_guests INTEGER NOT NULL DEFAULT 0,
                length_m REAL,
                price_per_night REAL NOT NULL DEFAULT 0,
                hero_image VARCHAR(500),
                features TEXT NOT NULL DEFAULT '[]',
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_dahabiyas_slug ON dahabiyas(slug);
        "#,
    },
    Migration {
        version: 4,
        name: "create_itineraries",
        up: r#"
            CREATE TABLE IF NOT EXISTS itineraries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_itineraries_slug ON itineraries(slug);
            CREATE TABLE IF NOT EXISTS itinerary_days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                itinerary_id INTEGER NOT NULL,
                day_number INTEGER NOT NULL,
                title VARCHAR(200) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                meals VARCHAR(100),
                FOREIGN KEY (itinerary_id) REFERENCES itineraries(id) ON DELETE CASCADE,
                UNIQUE (itinerary_id, day_number)
            );
            CREATE INDEX IF NOT EXISTS idx_itinerary_days_itinerary_id ON itinerary_days(itinerary_id);
        "#,
    },
    Migration {
        version: 5,
        name: "create_packages",
        up: r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                duration_days INTEGER NOT NULL DEFAULT 1,
                price REAL NOT NULL DEFAULT 0,
                hero_image VARCHAR(500),
                itinerary_id INTEGER,
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (itinerary_id) REFERENCES itineraries(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_packages_slug ON packages(slug);
        "#,
    },
    Migration {
        version: 6,
        name: "create_bookings",
        up: r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                reference VARCHAR(20) NOT NULL UNIQUE,
                user_id INTEGER,
                dahabiya_id INTEGER,
                package_id INTEGER,
                guest_name VARCHAR(200) NOT NULL,
                email VARCHAR(255) NOT NULL,
                phone VARCHAR(50),
                start_date DATE NOT NULL,
                end_date DATE NOT NULL,
                guests INTEGER NOT NULL DEFAULT 1,
                total_price REAL NOT NULL DEFAULT 0,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                notes TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (dahabiya_id) REFERENCES dahabiyas(id) ON DELETE SET NULL,
                FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_bookings_reference ON bookings(reference);
            CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
            CREATE INDEX IF NOT EXISTS idx_bookings_created_at ON bookings(created_at);
        "#,
    },
    Migration {
        version: 7,
        name: "create_blog_posts",
        up: r#"
            CREATE TABLE IF NOT EXISTS blog_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(255) NOT NULL UNIQUE,
                title VARCHAR(255) NOT NULL,
                content TEXT NOT NULL,
                content_html TEXT NOT NULL,
                excerpt TEXT NOT NULL DEFAULT '',
                hero_image VARCHAR(500),
                author_id INTEGER NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                published_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_blog_posts_slug ON blog_posts(slug);
            CREATE INDEX IF NOT EXISTS idx_blog_posts_status ON blog_posts(status);
        "#,
    },
    Migration {
        version: 8,
        name: "create_reviews",
        up: r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_name VARCHAR(200) NOT NULL,
                email VARCHAR(255),
                rating INTEGER NOT NULL,
                title VARCHAR(200),
                body TEXT NOT NULL,
                dahabiya_id INTEGER,
                status VARCHAR(20) NOT NULL DEFAULT 'pending',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (dahabiya_id) REFERENCES dahabiyas(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_reviews_status ON reviews(status);
        "#,
    },
    Migration {
        version: 9,
        name: "create_contact_messages",
        up: r#"
            CREATE TABLE IF NOT EXISTS contact_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(200) NOT NULL,
                email VARCHAR(255) NOT NULL,
                phone VARCHAR(50),
                subject VARCHAR(255) NOT NULL DEFAULT '',
                message TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 10,
        name: "create_media_assets",
        up: r#"
            CREATE TABLE IF NOT EXISTS media_assets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename VARCHAR(255) NOT NULL,
                url VARCHAR(500) NOT NULL,
                kind VARCHAR(20) NOT NULL DEFAULT 'image',
                content_type VARCHAR(100) NOT NULL,
                size INTEGER NOT NULL DEFAULT 0,
                alt VARCHAR(255),
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 11,
        name: "create_gallery",
        up: r#"
            CREATE TABLE IF NOT EXISTS gallery_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug VARCHAR(100) NOT NULL UNIQUE,
                name VARCHAR(100) NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS gallery_images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category_id INTEGER NOT NULL,
                url VARCHAR(500) NOT NULL,
                caption VARCHAR(255),
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (category_id) REFERENCES gallery_categories(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_gallery_images_category_id ON gallery_images(category_id);
        "#,
    },
    Migration {
        version: 12,
        name: "create_partners",
        up: r#"
            CREATE TABLE IF NOT EXISTS partners (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(200) NOT NULL,
                logo_url VARCHAR(500) NOT NULL,
                website_url VARCHAR(500),
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
    Migration {
        version: 13,
        name: "create_website_content",
        up: r#"
            CREATE TABLE IF NOT EXISTS website_content (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key VARCHAR(200) NOT NULL UNIQUE,
                title VARCHAR(255),
                value TEXT NOT NULL DEFAULT '',
                kind VARCHAR(20) NOT NULL DEFAULT 'text',
                page VARCHAR(100) NOT NULL DEFAULT 'global',
                section VARCHAR(100) NOT NULL DEFAULT 'general',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_website_content_key ON website_content(key);
            CREATE INDEX IF NOT EXISTS idx_website_content_page ON website_content(page);
            INSERT OR IGNORE INTO website_content (key, title, value, kind, page, section)
            VALUES
                ('site_name', 'Site name', 'Dahabiyat Nile Cruises', 'text', 'global', 'branding'),
                ('site_description', 'Site description', 'Traditional sailing cruises on the Nile', 'text', 'global', 'branding'),
                ('site_logo', 'Site logo', '/images/logo.png', 'image', 'global', 'branding'),
                ('navbar_logo', 'Navbar logo', '', 'image', 'global', 'branding'),
                ('footer_text', 'Footer text', '', 'html', 'global', 'footer');
        "#,
    },
    Migration {
        version: 14,
        name: "create_notifications",
        up: r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind VARCHAR(50) NOT NULL,
                title VARCHAR(255) NOT NULL,
                body TEXT NOT NULL DEFAULT '',
                read INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_notifications_read ON notifications(read);
        "#,
    },
];

/// Run all pending migrations against the pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;

    let applied: Vec<i64> = sqlx::query("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?
        .into_iter()
        .map(|row| row.get("version"))
        .collect();

    for migration in MIGRATIONS {
        if applied.contains(&(migration.version as i64)) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // Each migration block can hold multiple statements
        for statement in split_statements(migration.up) {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .with_context(|| {
                    format!(
                        "Migration {} ({}) failed on statement: {}",
                        migration.version, migration.name, statement
                    )
                })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}

/// Split a migration block into individual SQL statements.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
