//! Business logic services
//!
//! Services sit between the HTTP handlers and the repositories. They own
//! validation, cache invalidation, and cross-entity workflows such as the
//! booking notification fan-out.

pub mod blog;
pub mod booking;
pub mod content;
pub mod email;
pub mod password;
pub mod user;

pub use blog::BlogService;
pub use booking::{BookingService, BookingServiceError};
pub use content::{content_keys, ContentService, ContentServiceError};
pub use email::EmailService;
pub use user::{UserService, UserServiceError};
