//! SQLite storage implementation for the local key/value store.

mod model;
mod repository;

pub use model::LocalStorageItemDB;
pub use repository::SqliteLocalStore;

// Re-export trait from core for convenience
pub use mohallaa_core::storage::LocalStore;
