mod location_settings;

pub use location_settings::*;
