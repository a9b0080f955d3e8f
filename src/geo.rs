//! geo.rs — great-circle distance between coordinate pairs.
//!
//! Haversine over the mean Earth radius. Missing coordinates on either side
//! yield an infinite sentinel distance so every downstream threshold
//! comparison fails closed for that signal.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance in meters between two points.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Distance between two optional points; either side missing yields the
/// infinite sentinel.
pub fn distance_or_infinite(a: Option<GeoPoint>, b: Option<GeoPoint>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => haversine_m(a, b),
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAKARTA: GeoPoint = GeoPoint {
        lat: -6.2088,
        lng: 106.8456,
    };
    const BANDUNG: GeoPoint = GeoPoint {
        lat: -6.9175,
        lng: 107.6191,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_m(JAKARTA, JAKARTA), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = haversine_m(JAKARTA, BANDUNG);
        let ba = haversine_m(BANDUNG, JAKARTA);
        assert!((ab - ba).abs() < 1e-6, "expected symmetry, got {ab} vs {ba}");
    }

    #[test]
    fn jakarta_bandung_roughly_118_km() {
        let d = haversine_m(JAKARTA, BANDUNG);
        assert!(
            (115_000.0..122_000.0).contains(&d),
            "Jakarta-Bandung should be ~118 km, got {d} m"
        );
    }

    #[test]
    fn small_offsets_scale_linearly() {
        // ~0.001 deg latitude is ~111 m.
        let a = GeoPoint::new(-6.2000, 106.8000);
        let b = GeoPoint::new(-6.2010, 106.8000);
        let d = haversine_m(a, b);
        assert!((100.0..125.0).contains(&d), "got {d} m");
    }

    #[test]
    fn missing_side_is_infinite() {
        assert_eq!(distance_or_infinite(None, Some(JAKARTA)), f64::INFINITY);
        assert_eq!(distance_or_infinite(Some(JAKARTA), None), f64::INFINITY);
        assert_eq!(distance_or_infinite(None, None), f64::INFINITY);
        assert_eq!(distance_or_infinite(Some(JAKARTA), Some(JAKARTA)), 0.0);
    }
}
