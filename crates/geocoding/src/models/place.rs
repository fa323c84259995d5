use serde::{Deserialize, Serialize};

/// A place resolved from coordinates.
///
/// `city` and `state` are always present; providers that cannot fill both
/// report `GeocodingError::IncompletePayload` instead of returning a `Place`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// City-equivalent (city, town, village, locality)
    pub city: String,

    /// Subdivision-equivalent (state, province, principal subdivision)
    pub state: String,

    /// Neighborhood or suburb, when the provider exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,

    /// Provider that produced this place
    pub source: String,
}

impl Place {
    pub fn new(city: impl Into<String>, state: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            neighborhood: None,
            zipcode: None,
            source: source.into(),
        }
    }

    pub fn with_neighborhood(mut self, neighborhood: Option<String>) -> Self {
        self.neighborhood = neighborhood;
        self
    }

    pub fn with_zipcode(mut self, zipcode: Option<String>) -> Self {
        self.zipcode = zipcode;
        self
    }
}
