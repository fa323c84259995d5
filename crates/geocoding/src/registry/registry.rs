//! Provider registry for orchestrating reverse-geocoding providers.

use std::sync::Arc;

use log::{debug, warn};

use super::FetchDiagnostics;
use crate::backoff::{retry_with_backoff, RetryPolicy};
use crate::errors::{GeocodingError, RetryClass};
use crate::models::{Coordinates, Place};
use crate::provider::ReverseGeocoder;

/// Provider registry for reverse geocoding.
///
/// Providers are tried in priority order. Each provider gets the full
/// [`RetryPolicy`]; once its attempts are exhausted the next provider is
/// tried. A `Never`-class error ends the lookup immediately.
pub struct GeocoderRegistry {
    providers: Vec<Arc<dyn ReverseGeocoder>>,
    retry_policy: RetryPolicy,
}

impl GeocoderRegistry {
    /// Create a registry with the default policy (2 attempts, 1s base delay).
    pub fn new(providers: Vec<Arc<dyn ReverseGeocoder>>) -> Self {
        Self::with_policy(providers, RetryPolicy::default())
    }

    pub fn with_policy(
        mut providers: Vec<Arc<dyn ReverseGeocoder>>,
        retry_policy: RetryPolicy,
    ) -> Self {
        // Stable sort keeps registration order among equal priorities
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            retry_policy,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn ReverseGeocoder>] {
        &self.providers
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Resolve coordinates to a place.
    pub async fn reverse(&self, coords: Coordinates) -> Result<Place, GeocodingError> {
        self.reverse_with_diagnostics(coords).await.0
    }

    /// Resolve coordinates and report what every provider did.
    pub async fn reverse_with_diagnostics(
        &self,
        coords: Coordinates,
    ) -> (Result<Place, GeocodingError>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();

        if self.providers.is_empty() {
            warn!("No geocoding providers registered");
            return (Err(GeocodingError::NoProvidersAvailable), diagnostics);
        }

        for provider in &self.providers {
            let mut calls = 0u32;
            let result = retry_with_backoff(&self.retry_policy, |attempt| {
                calls = attempt + 1;
                provider.reverse(coords)
            })
            .await;

            match result {
                Ok(place) => {
                    debug!("{} resolved {} in {} call(s)", provider.id(), coords, calls);
                    diagnostics.record_success(provider.id(), calls);
                    return (Ok(place), diagnostics);
                }
                Err(e) => {
                    diagnostics.record_error(provider.id(), calls, e.to_string());

                    if e.retry_class() == RetryClass::Never {
                        return (Err(e), diagnostics);
                    }

                    warn!(
                        "Geocoding provider {} failed after {} call(s): {}",
                        provider.id(),
                        calls,
                        e
                    );
                }
            }
        }

        warn!("Reverse geocoding failed: {}", diagnostics.summary());
        (Err(GeocodingError::AllProvidersFailed), diagnostics)
    }
}
