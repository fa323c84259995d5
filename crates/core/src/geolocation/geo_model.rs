use mohallaa_geocoding::Place;
use serde::{Deserialize, Serialize};

/// A resolved location as the app stores and displays it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// Reported accuracy of the device fix, in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl LocationData {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            neighborhood: None,
            zipcode: None,
            accuracy: None,
        }
    }

    /// Attaches the device fix accuracy in metres.
    pub fn with_accuracy(mut self, accuracy: Option<f64>) -> Self {
        self.accuracy = accuracy;
        self
    }
}

impl From<Place> for LocationData {
    fn from(place: Place) -> Self {
        Self {
            city: place.city,
            state: place.state,
            neighborhood: place.neighborhood,
            zipcode: place.zipcode,
            accuracy: None,
        }
    }
}

/// One persisted cache entry. Timestamps are epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCacheEntry {
    pub data: LocationData,
    pub timestamp: i64,
    pub expires: i64,
}

impl GeoCacheEntry {
    pub fn is_valid_at(&self, now_millis: i64) -> bool {
        now_millis <= self.expires
    }
}

/// Entry counts for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeoCacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}
