//! Reverse-geocoding provider abstractions and implementations.
//!
//! This module contains:
//! - The `ReverseGeocoder` trait that all providers implement
//! - `JsonEndpointProvider`, an HTTP/JSON provider driven by an `EndpointConfig`
//!   (with presets for Nominatim and BigDataCloud)

mod json_endpoint;
mod traits;

pub use json_endpoint::{EndpointConfig, JsonEndpointProvider, DEFAULT_REQUEST_TIMEOUT};
pub use traits::ReverseGeocoder;
