//! Persisted reverse-geocoding results keyed by rounded coordinates.
//!
//! The whole cache is one JSON object stored under a single [`LocalStore`]
//! key, mapping `"lat,lng"` to a [`GeoCacheEntry`]. Every failure here is
//! soft: a broken store or corrupt JSON behaves like an empty cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};

use super::geo_model::{GeoCacheEntry, GeoCacheStats, LocationData};
use crate::storage::LocalStore;

/// Storage key holding the serialized cache map.
pub const GEOLOCATION_STORAGE_KEY: &str = "mohallaa_geolocation_cache";

/// How long a resolved location stays valid.
pub const GEOLOCATION_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Decimal places kept when bucketing coordinates (about 100 m).
pub const COORDINATE_PRECISION: i32 = 3;

type EntryMap = HashMap<String, GeoCacheEntry>;

/// Rounds to [`COORDINATE_PRECISION`] decimals, ties toward positive infinity.
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_PRECISION);
    let rounded = (value * factor + 0.5).floor() / factor;
    // -0.0 would otherwise render as "-0" and split a grid cell in two
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Cache key for a coordinate pair: `"{rounded_lat},{rounded_lng}"`.
pub fn cache_key(latitude: f64, longitude: f64) -> String {
    format!(
        "{},{}",
        round_coordinate(latitude),
        round_coordinate(longitude)
    )
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Coordinate-keyed location cache backed by a [`LocalStore`].
pub struct GeolocationCache {
    store: Arc<dyn LocalStore>,
    storage_key: String,
    ttl: Duration,
}

impl GeolocationCache {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self::with_options(store, GEOLOCATION_STORAGE_KEY, GEOLOCATION_CACHE_TTL)
    }

    pub fn with_options(
        store: Arc<dyn LocalStore>,
        storage_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            ttl,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached location for the grid cell containing `(latitude, longitude)`.
    ///
    /// An expired entry is removed from the store before returning `None`.
    pub fn get(&self, latitude: f64, longitude: f64) -> Option<LocationData> {
        let key = cache_key(latitude, longitude);
        let mut entries = self.load()?;

        let entry = entries.get(&key)?;
        if entry.is_valid_at(now_millis()) {
            debug!("Geolocation cache hit: {}", key);
            return Some(entry.data.clone());
        }

        debug!("Geolocation cache entry expired: {}", key);
        entries.remove(&key);
        self.save(&entries);
        None
    }

    /// Stores `data` for the grid cell, sweeping expired entries first.
    pub fn set(&self, latitude: f64, longitude: f64, data: LocationData) {
        let key = cache_key(latitude, longitude);
        let now = now_millis();
        let mut entries = self.load().unwrap_or_default();

        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid_at(now));
        if entries.len() < before {
            debug!(
                "Swept {} expired geolocation entries",
                before - entries.len()
            );
        }

        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        entries.insert(
            key,
            GeoCacheEntry {
                data,
                timestamp: now,
                expires: now.saturating_add(ttl_millis),
            },
        );
        self.save(&entries);
    }

    pub fn remove(&self, latitude: f64, longitude: f64) {
        let Some(mut entries) = self.load() else {
            return;
        };
        if entries.remove(&cache_key(latitude, longitude)).is_some() {
            self.save(&entries);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove_item(&self.storage_key) {
            warn!("Failed to clear geolocation cache: {}", e);
        }
    }

    pub fn stats(&self) -> GeoCacheStats {
        let Some(entries) = self.load() else {
            return GeoCacheStats::default();
        };
        let now = now_millis();
        let valid = entries.values().filter(|e| e.is_valid_at(now)).count();
        GeoCacheStats {
            total: entries.len(),
            valid,
            expired: entries.len() - valid,
        }
    }

    /// Reads the stored map. `None` when nothing is stored or it is unreadable.
    fn load(&self) -> Option<EntryMap> {
        let raw = match self.store.get_item(&self.storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read geolocation cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("Discarding unreadable geolocation cache: {}", e);
                None
            }
        }
    }

    fn save(&self, entries: &EntryMap) {
        let raw = match serde_json::to_string(entries) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize geolocation cache: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set_item(&self.storage_key, &raw) {
            warn!("Failed to write geolocation cache: {}", e);
        }
    }
}
