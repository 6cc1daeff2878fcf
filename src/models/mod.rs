//! Domain models
//!
//! Entities, input types, and shared pagination containers used by the
//! repositories, services, and API handlers.

pub mod blog;
pub mod booking;
pub mod common;
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

pub use blog::{BlogPost, CreateBlogPostInput, PostStatus, UpdateBlogPostInput};
pub use booking::{Booking, BookingStatus, CreateBookingInput, UpdateBookingInput};
pub use common::{ListParams, PagedResult};
pub use contact::{ContactMessage, CreateContactInput};
pub use content::{ContentEntry, ContentKind, PageContent, UpsertContentInput};
pub use dahabiya::{CreateDahabiyaInput, Dahabiya, UpdateDahabiyaInput, VesselStatus};
pub use gallery::{GalleryCategory, GalleryCategoryInput, GalleryImage, GalleryImageInput};
pub use itinerary::{Itinerary, ItineraryDay, ItineraryDayInput, ItineraryInput};
pub use media::{MediaAsset, MediaKind};
pub use notification::Notification;
pub use package::{CreatePackageInput, Package, UpdatePackageInput};
pub use partner::{Partner, PartnerInput};
pub use review::{CreateReviewInput, Review, ReviewStatus};
pub use session::Session;
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, UserStatus};
