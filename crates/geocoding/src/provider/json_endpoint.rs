//! HTTP/JSON reverse-geocoding provider.
//!
//! Issues `GET {url}?{lat_param}={lat}&{lng_param}={lng}` and pulls the
//! city-equivalent and subdivision-equivalent strings out of the JSON body via
//! dotted field paths. Everything else in the body is ignored.
//!
//! Presets:
//! - [`JsonEndpointProvider::nominatim`] (OpenStreetMap)
//! - [`JsonEndpointProvider::bigdatacloud`]

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::GeocodingError;
use crate::models::{Coordinates, Place};
use crate::provider::ReverseGeocoder;

/// Default HTTP request timeout, covering connect, headers and body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

const USER_AGENT: &str = concat!("mohallaa/", env!("CARGO_PKG_VERSION"));

/// Where to send the request and how to read the answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    /// Provider id used in logs and errors
    pub id: String,

    /// Base URL of the reverse endpoint
    pub url: String,

    /// Query parameter name carrying the latitude
    pub latitude_param: String,

    /// Query parameter name carrying the longitude
    pub longitude_param: String,

    /// Fixed query parameters appended to every request
    #[serde(default)]
    pub extra_params: Vec<(String, String)>,

    /// Dotted JSON paths for the city, first non-empty wins
    pub city_paths: Vec<String>,

    /// Dotted JSON paths for the state
    pub state_paths: Vec<String>,

    #[serde(default)]
    pub neighborhood_paths: Vec<String>,

    #[serde(default)]
    pub zipcode_paths: Vec<String>,

    /// Lower is tried first
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    10
}

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl EndpointConfig {
    /// OpenStreetMap Nominatim `/reverse`.
    pub fn nominatim() -> Self {
        Self {
            id: "NOMINATIM".to_string(),
            url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            latitude_param: "lat".to_string(),
            longitude_param: "lon".to_string(),
            extra_params: vec![
                ("format".to_string(), "json".to_string()),
                ("addressdetails".to_string(), "1".to_string()),
                ("zoom".to_string(), "18".to_string()),
            ],
            city_paths: paths(&[
                "address.city",
                "address.town",
                "address.village",
                "address.hamlet",
            ]),
            state_paths: paths(&["address.state"]),
            neighborhood_paths: paths(&["address.neighbourhood", "address.suburb"]),
            zipcode_paths: paths(&["address.postcode"]),
            priority: 1,
        }
    }

    /// BigDataCloud client-side reverse geocoding.
    pub fn bigdatacloud() -> Self {
        Self {
            id: "BIGDATACLOUD".to_string(),
            url: "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string(),
            latitude_param: "latitude".to_string(),
            longitude_param: "longitude".to_string(),
            extra_params: vec![("localityLanguage".to_string(), "en".to_string())],
            city_paths: paths(&["city", "locality"]),
            state_paths: paths(&["principalSubdivision"]),
            neighborhood_paths: Vec::new(),
            zipcode_paths: paths(&["postcode"]),
            priority: 2,
        }
    }
}

/// Reverse geocoder backed by a JSON HTTP endpoint.
pub struct JsonEndpointProvider {
    client: Client,
    config: EndpointConfig,
    timeout: Duration,
}

impl JsonEndpointProvider {
    pub fn new(config: EndpointConfig) -> Result<Self, GeocodingError> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Fails with [`GeocodingError::ProviderError`] if the HTTP client cannot
    /// be built (e.g. no TLS backend).
    pub fn with_timeout(
        config: EndpointConfig,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = build_client(&config.id, USER_AGENT)?;
        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    pub fn nominatim() -> Result<Self, GeocodingError> {
        Self::new(EndpointConfig::nominatim())
    }

    pub fn bigdatacloud() -> Result<Self, GeocodingError> {
        Self::new(EndpointConfig::bigdatacloud())
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    async fn fetch(&self, coords: Coordinates) -> Result<Value, GeocodingError> {
        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                (
                    self.config.latitude_param.as_str(),
                    coords.latitude.to_string(),
                ),
                (
                    self.config.longitude_param.as_str(),
                    coords.longitude.to_string(),
                ),
            ])
            .query(&self.config.extra_params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::HttpStatus {
                provider: self.config.id.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GeocodingError::Decode {
                provider: self.config.id.clone(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ReverseGeocoder for JsonEndpointProvider {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn priority(&self) -> u8 {
        self.config.priority
    }

    async fn reverse(&self, coords: Coordinates) -> Result<Place, GeocodingError> {
        // Dropping the request future on timeout aborts the in-flight call.
        let body = match tokio::time::timeout(self.timeout, self.fetch(coords)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(GeocodingError::Timeout {
                    provider: self.config.id.clone(),
                })
            }
        };

        let place = parse_place(&self.config, &body)?;
        debug!(
            "{} resolved {} to {}, {}",
            self.config.id, coords, place.city, place.state
        );
        Ok(place)
    }
}

fn build_client(provider: &str, user_agent: &str) -> Result<Client, GeocodingError> {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| GeocodingError::ProviderError {
            provider: provider.to_string(),
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// Walks a dotted path (`"address.city"`) and returns a trimmed, non-empty string.
fn lookup<'a>(body: &'a Value, path: &str) -> Option<&'a str> {
    path.split('.')
        .try_fold(body, |value, segment| value.get(segment))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_match(body: &Value, paths: &[String]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(body, path))
        .map(str::to_string)
}

/// Extracts a [`Place`] from a provider response body.
///
/// Both city and state are required; a body carrying only one of them is an
/// [`GeocodingError::IncompletePayload`].
pub(crate) fn parse_place(config: &EndpointConfig, body: &Value) -> Result<Place, GeocodingError> {
    let city = first_match(body, &config.city_paths).ok_or(GeocodingError::IncompletePayload {
        provider: config.id.clone(),
        missing: "city",
    })?;
    let state =
        first_match(body, &config.state_paths).ok_or(GeocodingError::IncompletePayload {
            provider: config.id.clone(),
            missing: "state",
        })?;

    Ok(Place::new(city, state, config.id.clone())
        .with_neighborhood(first_match(body, &config.neighborhood_paths))
        .with_zipcode(first_match(body, &config.zipcode_paths)))
}
