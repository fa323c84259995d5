//! Local geolocation cache.
//!
//! Avoids repeat reverse-geocoding calls for coordinates the user resolved
//! recently. Coordinates are rounded to a ~100 m grid cell so nearby fixes
//! share one entry; entries live for 24 hours in a [`LocalStore`].
//!
//! [`LocalStore`]: crate::storage::LocalStore

mod distance;
mod geo_cache;
mod geo_model;

pub use distance::{haversine_km, is_significant_move, DEFAULT_SIGNIFICANT_MOVE_KM};
pub use geo_cache::{
    cache_key, round_coordinate, GeolocationCache, COORDINATE_PRECISION,
    GEOLOCATION_CACHE_TTL, GEOLOCATION_STORAGE_KEY,
};
pub use geo_model::{GeoCacheEntry, GeoCacheStats, LocationData};
