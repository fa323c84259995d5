//! Reverse-geocoding provider trait definitions.

use async_trait::async_trait;

use crate::errors::GeocodingError;
use crate::models::{Coordinates, Place};

/// Trait for reverse-geocoding providers.
///
/// Implement this trait to add a new geocoding source. The registry orders
/// providers by [`priority`](Self::priority) and retries each one with
/// backoff before moving on to the next.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use mohallaa_geocoding::{Coordinates, GeocodingError, Place, ReverseGeocoder};
///
/// struct FixedGeocoder;
///
/// #[async_trait]
/// impl ReverseGeocoder for FixedGeocoder {
///     fn id(&self) -> &str {
///         "FIXED"
///     }
///
///     async fn reverse(&self, _coords: Coordinates) -> Result<Place, GeocodingError> {
///         Ok(Place::new("San Jose", "California", "FIXED"))
///     }
/// }
/// ```
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Unique identifier for this provider, used in logs and diagnostics.
    fn id(&self) -> &str;

    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Resolve coordinates to a place with both city and state filled in.
    async fn reverse(&self, coords: Coordinates) -> Result<Place, GeocodingError>;
}
