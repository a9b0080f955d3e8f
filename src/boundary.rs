//! boundary.rs — geographic boundary definitions and point-in-boundary tests.
//!
//! A boundary is configured per neighborhood (RT/RW) either as a circle
//! (center + radius in meters) or as a polygon (ordered vertex ring). A valid
//! polygon (>= 3 vertices) always takes precedence over the radius mode; the
//! precedence rule itself lives in `geofence`.

use serde::{Deserialize, Serialize};

use crate::geo::{haversine_m, GeoPoint};

/// Per-neighborhood boundary as supplied by the caller. Both modes are
/// visibly optional; `geofence` decides which one applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryDefinition {
    /// Radius-mode center.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<GeoPoint>,
    /// Radius-mode radius in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius_m: Option<f64>,
    /// Polygon-mode vertices. Fewer than 3 vertices is not a usable polygon.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polygon: Vec<GeoPoint>,
}

impl BoundaryDefinition {
    pub fn radius(center: GeoPoint, radius_m: f64) -> Self {
        Self {
            center: Some(center),
            radius_m: Some(radius_m),
            polygon: Vec::new(),
        }
    }

    pub fn polygon(vertices: Vec<GeoPoint>) -> Self {
        Self {
            center: None,
            radius_m: None,
            polygon: vertices,
        }
    }

    /// A polygon is usable once it has at least 3 vertices.
    pub fn has_polygon(&self) -> bool {
        self.polygon.len() >= 3
    }

    pub fn has_radius(&self) -> bool {
        self.center.is_some() && self.radius_m.is_some()
    }

    /// Centroid of the polygon vertices (arithmetic mean; good enough for the
    /// observability distance, not used for containment).
    pub fn polygon_centroid(&self) -> Option<GeoPoint> {
        if self.polygon.is_empty() {
            return None;
        }
        let n = self.polygon.len() as f64;
        let (lat, lng) = self
            .polygon
            .iter()
            .fold((0.0, 0.0), |(la, ln), p| (la + p.lat, ln + p.lng));
        Some(GeoPoint::new(lat / n, lng / n))
    }
}

/// True iff `point` lies within `radius_m` meters of `center` (inclusive).
pub fn point_in_radius(point: GeoPoint, center: GeoPoint, radius_m: f64) -> bool {
    haversine_m(point, center) <= radius_m
}

/// Ray-casting point-in-polygon test over lat/lng treated as planar
/// coordinates. The ring is closed first if the caller left it open.
pub fn point_in_polygon(point: GeoPoint, vertices: &[GeoPoint]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut ring: Vec<GeoPoint> = vertices.to_vec();
    let first = ring[0];
    let last = *ring.last().expect("non-empty ring");
    if first != last {
        ring.push(first);
    }

    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        let crosses = (a.lat > point.lat) != (b.lat > point.lat);
        if crosses {
            let x = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
            if point.lng < x {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    // A roughly 1 km square around a Jakarta kelurahan, left open on purpose.
    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(-6.200, 106.800),
            GeoPoint::new(-6.200, 106.810),
            GeoPoint::new(-6.210, 106.810),
            GeoPoint::new(-6.210, 106.800),
        ]
    }

    #[test]
    fn centroid_is_inside() {
        let verts = square();
        let b = BoundaryDefinition::polygon(verts.clone());
        let centroid = b.polygon_centroid().unwrap();
        assert!(point_in_polygon(centroid, &verts));
    }

    #[test]
    fn point_outside_hull_is_outside() {
        assert!(!point_in_polygon(GeoPoint::new(-6.250, 106.900), &square()));
        assert!(!point_in_polygon(GeoPoint::new(0.0, 0.0), &square()));
    }

    #[test]
    fn open_and_closed_rings_agree() {
        let mut closed = square();
        closed.push(closed[0]);
        let p = GeoPoint::new(-6.205, 106.805);
        assert_eq!(
            point_in_polygon(p, &square()),
            point_in_polygon(p, &closed)
        );
    }

    #[test]
    fn degenerate_polygon_is_never_inside() {
        let line = vec![GeoPoint::new(-6.2, 106.8), GeoPoint::new(-6.2, 106.9)];
        assert!(!point_in_polygon(GeoPoint::new(-6.2, 106.85), &line));
    }

    #[test]
    fn radius_containment_is_inclusive_of_center() {
        let c = GeoPoint::new(-6.2088, 106.8456);
        assert!(point_in_radius(c, c, 0.0));
        assert!(point_in_radius(GeoPoint::new(-6.2090, 106.8456), c, 500.0));
        assert!(!point_in_radius(GeoPoint::new(-6.2588, 106.8456), c, 500.0));
    }

    #[test]
    fn polygon_validity_needs_three_vertices() {
        assert!(!BoundaryDefinition::polygon(vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ])
        .has_polygon());
        assert!(BoundaryDefinition::polygon(square()).has_polygon());
    }
}
