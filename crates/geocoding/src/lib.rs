//! Mohallaa Geocoding Crate
//!
//! Provider-agnostic reverse geocoding: turn a latitude/longitude pair into a
//! city and state.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Coordinates    |  (validated lat/lng)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | GeocoderRegistry |  (priority order, retry with backoff, fallback)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ReverseGeocoder  |  (Nominatim, BigDataCloud, any JSON endpoint)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |      Place       |  (city, state, neighborhood, zipcode)
//! +------------------+
//! ```
//!
//! Caching is deliberately not part of this crate; `mohallaa-core` layers the
//! geolocation cache on top of the registry.

pub mod backoff;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use backoff::{retry_with_backoff, RetryPolicy, Retryable};
pub use errors::{GeocodingError, RetryClass};
pub use models::{Coordinates, Place};
pub use provider::{EndpointConfig, JsonEndpointProvider, ReverseGeocoder};
pub use registry::{FetchDiagnostics, GeocoderRegistry, ProviderAttempt};
