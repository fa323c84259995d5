//! Error types and retry classification for the geocoding crate.
//!
//! This module provides:
//! - [`GeocodingError`]: The main error enum for all reverse-geocoding operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while resolving coordinates to a place.
///
/// Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class).
#[derive(Error, Debug)]
pub enum GeocodingError {
    /// Latitude/longitude outside the valid range or not finite.
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// The provider did not answer within the configured timeout.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {provider}")]
    HttpStatus { provider: String, status: u16 },

    /// The response was missing the city or the state.
    /// A half-resolved place is never returned as a success.
    #[error("Incomplete payload from {provider}: missing {missing}")]
    IncompletePayload {
        provider: String,
        missing: &'static str,
    },

    /// The response body could not be decoded as JSON.
    #[error("Decode error from {provider}: {message}")]
    Decode { provider: String, message: String },

    /// The provider is not usable for this request (bad endpoint, etc.).
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// No providers are registered.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// Every attempt against every provider failed.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// A transport-level error from the HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GeocodingError {
    /// Returns the retry classification for this error.
    ///
    /// ```
    /// use mohallaa_geocoding::errors::{GeocodingError, RetryClass};
    ///
    /// let error = GeocodingError::Timeout { provider: "NOMINATIM".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Retry);
    ///
    /// let error = GeocodingError::InvalidCoordinates("lat=91".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::InvalidCoordinates(_) => RetryClass::Never,

            Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::IncompletePayload { .. }
            | Self::Decode { .. }
            | Self::Network(_) => RetryClass::Retry,

            Self::ProviderError { .. } => RetryClass::NextProvider,

            Self::NoProvidersAvailable | Self::AllProvidersFailed => RetryClass::Never,
        }
    }
}
