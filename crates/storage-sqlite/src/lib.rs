//! SQLite storage implementation for Mohallaa.
//!
//! This crate provides the persistent [`LocalStore`] using Diesel ORM with
//! SQLite. It contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The `local_storage` key/value table and its repository
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies
//! exist. `mohallaa-core` is database-agnostic and works with the trait.
//!
//! ```text
//! core (GeolocationCache, ...)
//!          │
//!          ▼  LocalStore
//!  storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod local_store;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, DbConnection, DbPool};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use local_store::{LocalStore, SqliteLocalStore};

// Re-export from mohallaa-core for convenience
pub use mohallaa_core::errors::{DatabaseError, Error, Result};
