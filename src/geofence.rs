//! geofence.rs — neighborhood boundary validation with precedence rules.
//!
//! 1. No candidate coordinates → invalid, explicit error text.
//! 2. No usable boundary on either axis → valid, validation skipped, warning.
//! 3. Valid polygon (>= 3 vertices) → point-in-polygon, authoritative even
//!    when a radius is also configured.
//! 4. Radius only → within-distance test.
//!
//! The computed distance is surfaced even in polygon mode (to the radius
//! center when configured, else to the polygon centroid) for observability.

use serde::Serialize;

use crate::boundary::{point_in_polygon, point_in_radius, BoundaryDefinition};
use crate::geo::{haversine_m, GeoPoint};

/// Which containment test actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceMethod {
    Polygon,
    Radius,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeofenceResult {
    pub is_valid: bool,
    /// True when a configured boundary was evaluated and excluded the point.
    pub mismatch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    pub method: GeofenceMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Validate candidate coordinates against the per-neighborhood boundary.
pub fn validate(
    coordinates: Option<GeoPoint>,
    boundary: Option<&BoundaryDefinition>,
) -> GeofenceResult {
    let Some(point) = coordinates else {
        return GeofenceResult {
            is_valid: false,
            mismatch: false,
            distance_m: None,
            method: GeofenceMethod::Skipped,
            warning: Some("submission has no coordinates to validate".to_string()),
        };
    };

    let Some(boundary) = boundary.filter(|b| b.has_polygon() || b.has_radius()) else {
        return GeofenceResult {
            is_valid: true,
            mismatch: false,
            distance_m: None,
            method: GeofenceMethod::Skipped,
            warning: Some("no boundary configured; geofence validation skipped".to_string()),
        };
    };

    // Observability distance: radius center when present, else polygon centroid.
    let reference = boundary.center.or_else(|| boundary.polygon_centroid());
    let distance_m = reference.map(|r| haversine_m(point, r));

    if boundary.has_polygon() {
        let inside = point_in_polygon(point, &boundary.polygon);
        return GeofenceResult {
            is_valid: inside,
            mismatch: !inside,
            distance_m,
            method: GeofenceMethod::Polygon,
            warning: (!inside).then(|| "location falls outside the neighborhood polygon".to_string()),
        };
    }

    // Radius mode; has_radius() guarantees both fields.
    let center = boundary.center.expect("radius boundary has a center");
    let radius_m = boundary.radius_m.expect("radius boundary has a radius");
    let inside = point_in_radius(point, center, radius_m);
    GeofenceResult {
        is_valid: inside,
        mismatch: !inside,
        distance_m,
        method: GeofenceMethod::Radius,
        warning: (!inside).then(|| {
            format!(
                "location is {:.0} m from the boundary center (allowed {:.0} m)",
                distance_m.unwrap_or_default(),
                radius_m
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: GeoPoint = GeoPoint {
        lat: -6.2088,
        lng: 106.8456,
    };

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(-6.200, 106.800),
            GeoPoint::new(-6.200, 106.810),
            GeoPoint::new(-6.210, 106.810),
            GeoPoint::new(-6.210, 106.800),
        ]
    }

    #[test]
    fn missing_coordinates_are_invalid_with_error() {
        let b = BoundaryDefinition::radius(CENTER, 500.0);
        let r = validate(None, Some(&b));
        assert!(!r.is_valid);
        assert!(!r.mismatch);
        assert!(r.warning.is_some());
    }

    #[test]
    fn no_boundary_is_valid_but_skipped() {
        let r = validate(Some(CENTER), None);
        assert!(r.is_valid);
        assert_eq!(r.method, GeofenceMethod::Skipped);
        assert!(r.warning.unwrap().contains("skipped"));
    }

    #[test]
    fn empty_boundary_definition_is_also_skipped() {
        let b = BoundaryDefinition {
            center: None,
            radius_m: None,
            polygon: Vec::new(),
        };
        let r = validate(Some(CENTER), Some(&b));
        assert!(r.is_valid);
        assert_eq!(r.method, GeofenceMethod::Skipped);
    }

    #[test]
    fn radius_mode_accepts_inside_point() {
        let b = BoundaryDefinition::radius(CENTER, 500.0);
        let near = GeoPoint::new(-6.2098, 106.8456); // ~110 m south
        let r = validate(Some(near), Some(&b));
        assert!(r.is_valid);
        assert_eq!(r.method, GeofenceMethod::Radius);
        assert!(r.distance_m.unwrap() < 500.0);
    }

    #[test]
    fn radius_mode_rejects_point_past_radius() {
        let b = BoundaryDefinition::radius(CENTER, 500.0);
        // ~600 m south of the center (0.0054 deg latitude).
        let out = GeoPoint::new(CENTER.lat - 0.0054, CENTER.lng);
        let r = validate(Some(out), Some(&b));
        assert!(!r.is_valid);
        assert!(r.mismatch);
        assert_eq!(r.method, GeofenceMethod::Radius);
        let d = r.distance_m.unwrap();
        assert!((550.0..650.0).contains(&d), "distance {d}");
        assert!(r.warning.is_some());
    }

    #[test]
    fn polygon_takes_precedence_over_radius() {
        // Point inside the radius but outside the polygon: polygon wins.
        let mut b = BoundaryDefinition::polygon(square());
        b.center = Some(GeoPoint::new(-6.205, 106.805));
        b.radius_m = Some(10_000.0);
        let outside_polygon = GeoPoint::new(-6.220, 106.805);
        let r = validate(Some(outside_polygon), Some(&b));
        assert_eq!(r.method, GeofenceMethod::Polygon);
        assert!(!r.is_valid);
        assert!(r.mismatch);
        assert!(r.distance_m.is_some(), "distance surfaced in polygon mode");
    }

    #[test]
    fn polygon_accepts_centroid() {
        let b = BoundaryDefinition::polygon(square());
        let centroid = b.polygon_centroid().unwrap();
        let r = validate(Some(centroid), Some(&b));
        assert!(r.is_valid);
        assert_eq!(r.method, GeofenceMethod::Polygon);
    }

    #[test]
    fn degenerate_polygon_falls_back_to_radius() {
        let mut b = BoundaryDefinition::radius(CENTER, 500.0);
        b.polygon = vec![CENTER, GeoPoint::new(-6.21, 106.85)]; // 2 vertices: unusable
        let r = validate(Some(CENTER), Some(&b));
        assert_eq!(r.method, GeofenceMethod::Radius);
        assert!(r.is_valid);
    }
}
