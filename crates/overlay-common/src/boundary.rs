//! Boundary geometry and point containment.
//!
//! Geometries follow GeoJSON conventions: a polygon is a list of rings, ring 0
//! is the outer boundary and the remaining rings are holes. Coordinates are
//! `[lon, lat]` pairs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OverlayError, OverlayResult};

/// Closed sequence of `[lon, lat]` vertices.
pub type Ring = Vec<[f64; 2]>;

/// Outer ring followed by zero or more hole rings.
pub type Polygon = Vec<Ring>;

/// A boundary geometry as found in a GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryGeometry {
    Polygon {
        coordinates: Polygon,
    },
    MultiPolygon {
        coordinates: Vec<Polygon>,
    },
    /// Any other geometry type. Accepted on input, contains nothing.
    #[serde(other)]
    Unsupported,
}

impl BoundaryGeometry {
    /// Create a polygon geometry.
    pub fn polygon(coordinates: Polygon) -> Self {
        BoundaryGeometry::Polygon { coordinates }
    }

    /// Create a multi-polygon geometry.
    pub fn multi_polygon(coordinates: Vec<Polygon>) -> Self {
        BoundaryGeometry::MultiPolygon { coordinates }
    }

    /// Iterate the constituent polygons.
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            BoundaryGeometry::Polygon { coordinates } => std::slice::from_ref(coordinates),
            BoundaryGeometry::MultiPolygon { coordinates } => coordinates,
            BoundaryGeometry::Unsupported => &[],
        }
    }

    /// Check whether the point lies inside any constituent polygon.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        self.polygons()
            .iter()
            .any(|polygon| point_in_polygon(lon, lat, polygon))
    }

    /// Total number of ring vertices, i.e. the per-query containment cost.
    pub fn vertex_count(&self) -> usize {
        self.polygons()
            .iter()
            .flat_map(|polygon| polygon.iter())
            .map(Vec::len)
            .sum()
    }
}

/// Ray-casting test against a single ring.
///
/// Points exactly on an edge are not specially resolved.
pub fn point_in_ring(lon: f64, lat: f64, ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n == 0 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];

        if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Inside the outer ring and outside every hole.
pub fn point_in_polygon(lon: f64, lat: f64, polygon: &[Ring]) -> bool {
    let Some((outer, holes)) = polygon.split_first() else {
        return false;
    };

    if !point_in_ring(lon, lat, outer) {
        return false;
    }

    !holes.iter().any(|hole| point_in_ring(lon, lat, hole))
}

/// Check whether a point lies inside at least one of the geometries.
pub fn point_in_boundary(lon: f64, lat: f64, geometries: &[BoundaryGeometry]) -> bool {
    geometries.iter().any(|g| g.contains_point(lon, lat))
}

/// Boundary with per-polygon latitude bands computed once.
///
/// A horizontal ray at a latitude outside `[min_lat, max_lat)` of the outer
/// ring crosses no edge, so skipping such polygons never changes the answer
/// given by [`point_in_boundary`].
#[derive(Debug, Clone)]
pub struct PreparedBoundary<'a> {
    polygons: Vec<(&'a Polygon, f64, f64)>,
}

impl<'a> PreparedBoundary<'a> {
    pub fn new(geometries: &'a [BoundaryGeometry]) -> Self {
        let polygons = geometries
            .iter()
            .flat_map(|g| g.polygons().iter())
            .filter_map(|polygon| {
                let outer = polygon.first()?;
                let (min_lat, max_lat) = outer.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), [_, lat]| (lo.min(*lat), hi.max(*lat)),
                );
                Some((polygon, min_lat, max_lat))
            })
            .collect();

        Self { polygons }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons.iter().any(|(polygon, min_lat, max_lat)| {
            lat >= *min_lat && lat < *max_lat && point_in_polygon(lon, lat, polygon)
        })
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }
}

/// Extract boundary geometries from GeoJSON text.
///
/// Accepts a FeatureCollection, a single Feature, a bare geometry, or an array
/// of any of those. Features without a geometry are skipped.
pub fn boundary_from_geojson(text: &str) -> OverlayResult<Vec<BoundaryGeometry>> {
    let value: Value = serde_json::from_str(text)?;
    let mut geometries = Vec::new();
    collect_geometries(value, &mut geometries)?;
    Ok(geometries)
}

fn collect_geometries(value: Value, out: &mut Vec<BoundaryGeometry>) -> OverlayResult<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_geometries(item, out)?;
            }
            Ok(())
        }
        Value::Object(mut map) => {
            let kind = map.get("type").and_then(Value::as_str).map(str::to_owned);
            match kind.as_deref() {
                Some("FeatureCollection") => {
                    let features = map.remove("features").unwrap_or(Value::Array(Vec::new()));
                    collect_geometries(features, out)
                }
                Some("Feature") => match map.remove("geometry") {
                    Some(Value::Null) | None => Ok(()),
                    Some(geometry) => collect_geometries(geometry, out),
                },
                Some(_) => {
                    let geometry: BoundaryGeometry = serde_json::from_value(Value::Object(map))
                        .map_err(|e| OverlayError::InvalidBoundary(e.to_string()))?;
                    out.push(geometry);
                    Ok(())
                }
                None => Err(OverlayError::InvalidBoundary(
                    "object without a 'type' member".to_string(),
                )),
            }
        }
        other => Err(OverlayError::InvalidBoundary(format!(
            "unexpected JSON value: {}",
            other
        ))),
    }
}
