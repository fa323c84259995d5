//! Key/value local storage.
//!
//! The geolocation cache persists through [`LocalStore`]. Implementations:
//! - [`MemoryLocalStore`] (this crate): process-local, for tests and ephemeral sessions
//! - `SqliteLocalStore` (`mohallaa-storage-sqlite`): survives restarts

mod local_store;

pub use local_store::{LocalStore, MemoryLocalStore};
