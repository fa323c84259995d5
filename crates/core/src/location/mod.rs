//! Location resolution: coordinates in, city/state out.

mod geocoding_service;
mod location_model;
mod location_service;
mod location_traits;

pub use geocoding_service::GeocodingService;
pub use location_model::{LocationResolution, ReverseGeocodeResult};
pub use location_service::LocationService;
pub use location_traits::GeocodingServiceTrait;
