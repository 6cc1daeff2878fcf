//! Database layer
//!
//! SQLite-backed storage for single-binary deployment. The pool factory
//! handles directory creation and connection options, `migrations` applies
//! the embedded schema, and `repositories` holds per-entity data access.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
