use serde::{Deserialize, Serialize};

use crate::geolocation::LocationData;

/// Outcome of a reverse-geocoding request.
///
/// Failure is a value, not an error: `success == false` means the location is
/// unknown and the caller should fall back to manual selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseGeocodeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    pub success: bool,
    pub from_cache: bool,
}

impl ReverseGeocodeResult {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn found(data: LocationData, from_cache: bool) -> Self {
        Self {
            city: Some(data.city),
            state: Some(data.state),
            neighborhood: data.neighborhood,
            zipcode: data.zipcode,
            success: true,
            from_cache,
        }
    }

    /// The resolved location, if the lookup succeeded.
    pub fn location(&self) -> Option<LocationData> {
        if !self.success {
            return None;
        }
        Some(LocationData {
            city: self.city.clone()?,
            state: self.state.clone()?,
            neighborhood: self.neighborhood.clone(),
            zipcode: self.zipcode.clone(),
            accuracy: None,
        })
    }
}

/// What the app should do with a device fix.
#[derive(Clone, Debug, PartialEq)]
pub enum LocationResolution {
    Detected(LocationData),
    /// Lookup failed; ask the user to pick a neighborhood.
    ManualSelectionRequired,
}

impl LocationResolution {
    pub fn is_detected(&self) -> bool {
        matches!(self, LocationResolution::Detected(_))
    }
}
