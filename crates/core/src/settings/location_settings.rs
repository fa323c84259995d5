//! Tunables for the location stack.
//!
//! Defaults match production behavior; `from_env` overlays `MOHALLAA_*`
//! variables on top of them.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use mohallaa_geocoding::provider::DEFAULT_REQUEST_TIMEOUT;
use mohallaa_geocoding::{
    EndpointConfig, GeocoderRegistry, JsonEndpointProvider, RetryPolicy, ReverseGeocoder,
};

use crate::cache::DEFAULT_SWEEP_INTERVAL;
use crate::errors::{Error, Result};
use crate::geolocation::{
    DEFAULT_SIGNIFICANT_MOVE_KM, GEOLOCATION_CACHE_TTL, GEOLOCATION_STORAGE_KEY,
};

pub const ENV_PROVIDERS: &str = "MOHALLAA_GEOCODING_PROVIDERS";
pub const ENV_ENDPOINTS_JSON: &str = "MOHALLAA_GEOCODING_ENDPOINTS_JSON";
pub const ENV_TIMEOUT_MS: &str = "MOHALLAA_GEOCODING_TIMEOUT_MS";
pub const ENV_MAX_ATTEMPTS: &str = "MOHALLAA_GEOCODING_MAX_ATTEMPTS";
pub const ENV_BASE_DELAY_MS: &str = "MOHALLAA_GEOCODING_BASE_DELAY_MS";
pub const ENV_GEO_CACHE_TTL_SECS: &str = "MOHALLAA_GEO_CACHE_TTL_SECS";
pub const ENV_GEO_CACHE_KEY: &str = "MOHALLAA_GEO_CACHE_KEY";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "MOHALLAA_CACHE_SWEEP_INTERVAL_SECS";
pub const ENV_SIGNIFICANT_MOVE_KM: &str = "MOHALLAA_SIGNIFICANT_MOVE_KM";

#[derive(Clone, Debug, PartialEq)]
pub struct LocationSettings {
    /// Reverse-geocoding endpoints, tried in priority order
    pub providers: Vec<EndpointConfig>,
    pub request_timeout: Duration,
    /// Attempts per provider, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub geo_cache_ttl: Duration,
    pub geo_cache_storage_key: String,
    pub memory_cache_sweep_interval: Duration,
    pub significant_move_km: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            providers: vec![EndpointConfig::nominatim(), EndpointConfig::bigdatacloud()],
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: policy.max_attempts,
            base_delay: policy.base_delay,
            geo_cache_ttl: GEOLOCATION_CACHE_TTL,
            geo_cache_storage_key: GEOLOCATION_STORAGE_KEY.to_string(),
            memory_cache_sweep_interval: DEFAULT_SWEEP_INTERVAL,
            significant_move_km: DEFAULT_SIGNIFICANT_MOVE_KM,
        }
    }
}

impl LocationSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source. Unset variables keep
    /// their defaults; set but unparsable ones are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = var(ENV_ENDPOINTS_JSON) {
            settings.providers = serde_json::from_str(&raw)
                .map_err(|e| invalid(ENV_ENDPOINTS_JSON, &raw, &e.to_string()))?;
        } else if let Some(raw) = var(ENV_PROVIDERS) {
            settings.providers = parse_provider_list(&raw)?;
        }

        if let Some(raw) = var(ENV_TIMEOUT_MS) {
            settings.request_timeout = Duration::from_millis(parse_number(ENV_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = var(ENV_MAX_ATTEMPTS) {
            let attempts: u32 = parse_number(ENV_MAX_ATTEMPTS, &raw)?;
            if attempts == 0 {
                return Err(invalid(ENV_MAX_ATTEMPTS, &raw, "must be at least 1"));
            }
            settings.max_attempts = attempts;
        }
        if let Some(raw) = var(ENV_BASE_DELAY_MS) {
            settings.base_delay = Duration::from_millis(parse_number(ENV_BASE_DELAY_MS, &raw)?);
        }
        if let Some(raw) = var(ENV_GEO_CACHE_TTL_SECS) {
            settings.geo_cache_ttl =
                Duration::from_secs(parse_number(ENV_GEO_CACHE_TTL_SECS, &raw)?);
        }
        if let Some(raw) = var(ENV_GEO_CACHE_KEY) {
            settings.geo_cache_storage_key = raw;
        }
        if let Some(raw) = var(ENV_SWEEP_INTERVAL_SECS) {
            settings.memory_cache_sweep_interval =
                Duration::from_secs(parse_number(ENV_SWEEP_INTERVAL_SECS, &raw)?);
        }
        if let Some(raw) = var(ENV_SIGNIFICANT_MOVE_KM) {
            let km: f64 = parse_number(ENV_SIGNIFICANT_MOVE_KM, &raw)?;
            if !km.is_finite() || km < 0.0 {
                return Err(invalid(ENV_SIGNIFICANT_MOVE_KM, &raw, "must be >= 0"));
            }
            settings.significant_move_km = km;
        }

        debug!(
            "Location settings: {} provider(s), timeout {:?}, {} attempt(s)",
            settings.providers.len(),
            settings.request_timeout,
            settings.max_attempts
        );
        Ok(settings)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay)
    }

    /// Builds a registry with one HTTP provider per configured endpoint.
    /// Endpoints whose client cannot be built are logged and left out.
    pub fn build_registry(&self) -> GeocoderRegistry {
        let providers: Vec<Arc<dyn ReverseGeocoder>> = self
            .providers
            .iter()
            .cloned()
            .filter_map(
                |config| match JsonEndpointProvider::with_timeout(config, self.request_timeout) {
                    Ok(provider) => Some(Arc::new(provider) as Arc<dyn ReverseGeocoder>),
                    Err(e) => {
                        warn!("Skipping geocoding provider: {}", e);
                        None
                    }
                },
            )
            .collect();
        GeocoderRegistry::with_policy(providers, self.retry_policy())
    }
}

fn parse_provider_list(raw: &str) -> Result<Vec<EndpointConfig>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "nominatim" => Ok(EndpointConfig::nominatim()),
            "bigdatacloud" => Ok(EndpointConfig::bigdatacloud()),
            _ => Err(invalid(ENV_PROVIDERS, name, "unknown provider")),
        })
        .collect()
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| invalid(key, raw, &e.to_string()))
}

fn invalid(key: &str, raw: &str, reason: &str) -> Error {
    Error::InvalidConfigValue(format!("{}={:?}: {}", key, raw, reason))
}
