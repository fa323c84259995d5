use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use mohallaa_geocoding::{Coordinates, GeocoderRegistry};

use super::location_model::ReverseGeocodeResult;
use super::location_traits::GeocodingServiceTrait;
use crate::geolocation::{GeolocationCache, LocationData};
use crate::settings::LocationSettings;
use crate::storage::LocalStore;

/// Cache-first reverse geocoding with provider fallback.
#[derive(Clone)]
pub struct GeocodingService {
    cache: Arc<GeolocationCache>,
    registry: Arc<GeocoderRegistry>,
}

impl GeocodingService {
    pub fn new(cache: Arc<GeolocationCache>, registry: Arc<GeocoderRegistry>) -> Self {
        Self { cache, registry }
    }

    /// Wires the cache and HTTP providers described by `settings`.
    pub fn from_settings(settings: &LocationSettings, store: Arc<dyn LocalStore>) -> Self {
        let cache = GeolocationCache::with_options(
            store,
            settings.geo_cache_storage_key.clone(),
            settings.geo_cache_ttl,
        );
        Self::new(Arc::new(cache), Arc::new(settings.build_registry()))
    }

    pub fn cache(&self) -> &GeolocationCache {
        &self.cache
    }
}

#[async_trait]
impl GeocodingServiceTrait for GeocodingService {
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> ReverseGeocodeResult {
        if let Some(data) = self.cache.get(latitude, longitude) {
            return ReverseGeocodeResult::found(data, true);
        }

        let coords = match Coordinates::new(latitude, longitude) {
            Ok(coords) => coords,
            Err(e) => {
                warn!("Skipping reverse geocode: {}", e);
                return ReverseGeocodeResult::unknown();
            }
        };

        match self.registry.reverse(coords).await {
            Ok(place) => {
                debug!("Resolved {} via {}", coords, place.source);
                let data = LocationData::from(place);
                self.cache.set(latitude, longitude, data.clone());
                ReverseGeocodeResult::found(data, false)
            }
            Err(e) => {
                warn!("Reverse geocode failed for {}: {}", coords, e);
                ReverseGeocodeResult::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLocalStore;
    use async_trait::async_trait;
    use mohallaa_geocoding::{GeocodingError, Place, ReverseGeocoder};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedGeocoder {
        failures: u32,
        calls: AtomicU32,
    }

    impl ScriptedGeocoder {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReverseGeocoder for ScriptedGeocoder {
        fn id(&self) -> &str {
            "SCRIPTED"
        }

        async fn reverse(&self, _coords: Coordinates) -> Result<Place, GeocodingError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(GeocodingError::IncompletePayload {
                    provider: "SCRIPTED".to_string(),
                    missing: "state",
                })
            } else {
                Ok(Place::new("San Jose", "California", "SCRIPTED").with_zipcode(Some("95113".to_string())))
            }
        }
    }

    fn service(geocoder: Arc<ScriptedGeocoder>) -> GeocodingService {
        let cache = GeolocationCache::new(Arc::new(MemoryLocalStore::new()));
        let registry = GeocoderRegistry::new(vec![geocoder]);
        GeocodingService::new(Arc::new(cache), Arc::new(registry))
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success_writes_through() {
        let geocoder = ScriptedGeocoder::new(1);
        let service = service(geocoder.clone());

        let first = service.reverse_geocode(37.3341, -121.8936).await;
        assert!(first.success);
        assert!(!first.from_cache);
        assert_eq!(first.city.as_deref(), Some("San Jose"));
        assert_eq!(first.zipcode.as_deref(), Some("95113"));
        assert_eq!(geocoder.calls(), 2);

        let second = service.reverse_geocode(37.33412, -121.89362).await;
        assert!(second.success);
        assert!(second.from_cache);
        assert_eq!(geocoder.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_returns_unknown() {
        let geocoder = ScriptedGeocoder::new(u32::MAX);
        let service = service(geocoder.clone());

        let result = service.reverse_geocode(37.3341, -121.8936).await;

        assert_eq!(result, ReverseGeocodeResult::unknown());
        assert_eq!(geocoder.calls(), 2);
        assert_eq!(service.cache().stats().total, 0);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_skip_providers() {
        let geocoder = ScriptedGeocoder::new(0);
        let service = service(geocoder.clone());

        let result = service.reverse_geocode(123.0, 0.0).await;

        assert!(!result.success);
        assert_eq!(geocoder.calls(), 0);
    }
}
