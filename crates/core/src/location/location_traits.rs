use async_trait::async_trait;

use super::location_model::ReverseGeocodeResult;

/// Reverse geocoding as seen by feature code.
#[async_trait]
pub trait GeocodingServiceTrait: Send + Sync {
    /// Never fails; an unresolvable location is `success == false`.
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> ReverseGeocodeResult;
}
