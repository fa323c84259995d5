//! Great-circle distance and the "has the user actually moved" check.

use mohallaa_geocoding::Coordinates;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Moves shorter than this do not trigger a new lookup.
pub const DEFAULT_SIGNIFICANT_MOVE_KM: f64 = 0.5;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// `true` when there is no previous fix or the user moved at least
/// `threshold_km`.
pub fn is_significant_move(
    previous: Option<Coordinates>,
    current: Coordinates,
    threshold_km: f64,
) -> bool {
    match previous {
        None => true,
        Some(previous) => haversine_km(previous, current) >= threshold_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_known_distance() {
        // San Jose to San Francisco, roughly 67 km
        let d = haversine_km(point(37.3382, -121.8863), point(37.7749, -122.4194));
        assert!((d - 67.6).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_zero_distance() {
        let p = point(40.7128, -74.0060);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_significance() {
        let home = point(37.3341, -121.8936);
        let next_door = point(37.3345, -121.8940);
        let across_town = point(37.3700, -121.9200);

        assert!(is_significant_move(None, home, 0.5));
        assert!(!is_significant_move(Some(home), next_door, 0.5));
        assert!(is_significant_move(Some(home), across_town, 0.5));
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -89.0f64..89.0, lng1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lng2 in -179.0f64..179.0,
        ) {
            let a = point(lat1, lng1);
            let b = point(lat2, lng2);
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
