//! End-to-end location flow: device fix -> geocoding service -> cache ->
//! location resolution, with scripted providers standing in for HTTP.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mohallaa_core::geolocation::{GeolocationCache, GEOLOCATION_STORAGE_KEY};
use mohallaa_core::location::{
    GeocodingService, GeocodingServiceTrait, LocationResolution, LocationService,
};
use mohallaa_core::storage::{LocalStore, MemoryLocalStore};
use mohallaa_geocoding::{
    Coordinates, GeocoderRegistry, GeocodingError, Place, RetryPolicy, ReverseGeocoder,
};

struct Provider {
    id: &'static str,
    priority: u8,
    healthy: bool,
    calls: AtomicU32,
}

impl Provider {
    fn new(id: &'static str, priority: u8, healthy: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            priority,
            healthy,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReverseGeocoder for Provider {
    fn id(&self) -> &str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn reverse(&self, _coords: Coordinates) -> Result<Place, GeocodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(Place::new("Cupertino", "California", self.id))
        } else {
            Err(GeocodingError::HttpStatus {
                provider: self.id.to_string(),
                status: 503,
            })
        }
    }
}

fn build(
    store: Arc<MemoryLocalStore>,
    providers: Vec<Arc<dyn ReverseGeocoder>>,
) -> GeocodingService {
    let registry = GeocoderRegistry::with_policy(
        providers,
        RetryPolicy::new(2, Duration::from_millis(10)),
    );
    GeocodingService::new(
        Arc::new(GeolocationCache::new(store)),
        Arc::new(registry),
    )
}

#[tokio::test(start_paused = true)]
async fn fallback_provider_result_is_persisted_and_reused() {
    let store = Arc::new(MemoryLocalStore::new());
    let primary = Provider::new("PRIMARY", 1, false);
    let backup = Provider::new("BACKUP", 2, true);
    let service = build(store.clone(), vec![primary.clone(), backup.clone()]);

    let result = service.reverse_geocode(37.3230, -122.0322).await;
    assert!(result.success);
    assert!(!result.from_cache);
    assert_eq!(result.city.as_deref(), Some("Cupertino"));
    assert_eq!(primary.calls(), 2);
    assert_eq!(backup.calls(), 1);

    let raw = store.get_item(GEOLOCATION_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"37.323,-122.032\""));

    // A fresh service over the same store starts warm
    let restarted = build(store, vec![backup.clone()]);
    let cached = restarted.reverse_geocode(37.3231, -122.0323).await;
    assert!(cached.from_cache);
    assert_eq!(backup.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn unresolvable_location_asks_for_manual_selection() {
    let store = Arc::new(MemoryLocalStore::new());
    let service = build(store, vec![Provider::new("DOWN", 1, false)]);
    let locations = LocationService::new(Arc::new(service));

    let resolution = locations
        .resolve(Coordinates::new(12.9716, 77.5946).unwrap())
        .await;

    assert_eq!(resolution, LocationResolution::ManualSelectionRequired);
}
