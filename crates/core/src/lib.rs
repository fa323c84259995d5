//! Mohallaa Core - client-side building blocks.
//!
//! This crate holds the storage-agnostic pieces the Mohallaa client is built
//! on: a TTL memory cache, a coordinate-keyed geolocation cache, cache-first
//! reverse geocoding, and a realtime subscription adapter. Persistent storage
//! is provided by the `mohallaa-storage-sqlite` crate through the
//! [`storage::LocalStore`] trait.

pub mod cache;
pub mod errors;
pub mod geolocation;
pub mod location;
pub mod realtime;
pub mod settings;
pub mod storage;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
