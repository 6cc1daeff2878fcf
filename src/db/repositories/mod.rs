//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod blog;
pub mod booking;
pub mod contact;
pub mod content;
pub mod dahabiya;
pub mod gallery;
pub mod itinerary;
pub mod media;
pub mod notification;
pub mod package;
pub mod partner;
pub mod review;
pub mod session;
pub mod user;

pub use blog::{BlogRepository, SqlxBlogRepository};
pub use booking::{BookingRepository, MonthlyRevenue, SqlxBookingRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use content::{ContentRepository, SqlxContentRepository};
pub use dahabiya::{DahabiyaRepository, SqlxDahabiyaRepository};
pub use gallery::{GalleryRepository, SqlxGalleryRepository};
pub use itinerary::{ItineraryRepository, SqlxItineraryRepository};
pub use media::{MediaRepository, SqlxMediaRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use package::{PackageRepository, SqlxPackageRepository};
pub use partner::{PartnerRepository, SqlxPartnerRepository};
pub use review::{ReviewRepository, SqlxReviewRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
