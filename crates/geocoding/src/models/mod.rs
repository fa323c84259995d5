//! Geocoding models
//!
//! - `coordinates` - Validated latitude/longitude pair
//! - `place` - Resolved place returned by providers

mod coordinates;
mod place;

pub use coordinates::Coordinates;
pub use place::Place;
