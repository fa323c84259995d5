use std::sync::Arc;

use log::debug;
use mohallaa_geocoding::Coordinates;

use super::location_model::LocationResolution;
use super::location_traits::GeocodingServiceTrait;
use crate::geolocation::{is_significant_move, DEFAULT_SIGNIFICANT_MOVE_KM};

/// Turns device fixes into a neighborhood decision for the UI.
#[derive(Clone)]
pub struct LocationService {
    geocoding: Arc<dyn GeocodingServiceTrait>,
    significant_move_km: f64,
}

impl LocationService {
    pub fn new(geocoding: Arc<dyn GeocodingServiceTrait>) -> Self {
        Self {
            geocoding,
            significant_move_km: DEFAULT_SIGNIFICANT_MOVE_KM,
        }
    }

    pub fn with_significant_move_km(mut self, km: f64) -> Self {
        self.significant_move_km = km;
        self
    }

    pub async fn resolve(&self, coords: Coordinates) -> LocationResolution {
        self.resolve_with_accuracy(coords, None).await
    }

    /// Like [`resolve`](Self::resolve), carrying the device fix accuracy
    /// (metres) into the detected location. Cached lookups never store it.
    pub async fn resolve_with_accuracy(
        &self,
        coords: Coordinates,
        accuracy: Option<f64>,
    ) -> LocationResolution {
        let result = self
            .geocoding
            .reverse_geocode(coords.latitude, coords.longitude)
            .await;

        match result.location() {
            Some(data) => LocationResolution::Detected(data.with_accuracy(accuracy)),
            None => LocationResolution::ManualSelectionRequired,
        }
    }

    /// Resolves `current` only if it is far enough from `previous`.
    pub async fn refresh_if_moved(
        &self,
        previous: Option<Coordinates>,
        current: Coordinates,
    ) -> Option<LocationResolution> {
        if !is_significant_move(previous, current, self.significant_move_km) {
            debug!(
                "Skipping location refresh, moved less than {} km",
                self.significant_move_km
            );
            return None;
        }
        Some(self.resolve(current).await)
    }
}
