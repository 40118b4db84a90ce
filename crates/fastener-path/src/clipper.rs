//! Convex hull and polygon offsetting.
//!
//! Hulls are computed exactly on the integer grid with `geo`. Offsets go
//! through the Clipper bindings of `geo-clipper`, whose internal integer
//! factor is set to [`SCALING_FACTOR`] so Clipper works on the same grid.

use fastener_math::{scale, unscale, SCALING_FACTOR};
use geo::{ConvexHull, Coord as GeoCoord, LineString, MultiPoint, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};

use crate::polygon::{Point, Polygon};

/// Join type for offset corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetJoinType {
    /// Square corners: convex corners are cut flat at the offset distance.
    #[default]
    Square,
    /// Round corners
    Round,
    /// Mitered corners
    Miter,
}

impl From<OffsetJoinType> for JoinType {
    fn from(jt: OffsetJoinType) -> Self {
        match jt {
            OffsetJoinType::Square => JoinType::Square,
            OffsetJoinType::Round => JoinType::Round(0.25),
            OffsetJoinType::Miter => JoinType::Miter(2.0),
        }
    }
}

/// Convex hull of a point set, counter-clockwise, without the closing point.
///
/// Fewer than three distinct non-collinear points give a degenerate polygon
/// holding whatever hull `geo` reports; callers decide what that means.
pub fn convex_hull(points: &[Point]) -> Polygon {
    if points.is_empty() {
        return Polygon::default();
    }
    let multi: MultiPoint<i64> = points
        .iter()
        .map(|p| geo::Point::new(p.x, p.y))
        .collect::<Vec<_>>()
        .into();
    let hull = multi.convex_hull();
    let mut out: Vec<Point> = hull
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y))
        .collect();
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    let mut poly = Polygon::new(out);
    poly.ensure_ccw();
    poly
}

/// Offset a polygon by `delta` model units (positive grows).
///
/// Returns every resulting contour; a collapsed result is an empty vector.
pub fn offset(polygon: &Polygon, delta: f64, join_type: OffsetJoinType) -> Vec<Polygon> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    let geo_poly = polygon_to_geo(polygon);
    let result = geo_poly.offset(delta, join_type.into(), EndType::ClosedPolygon, SCALING_FACTOR);
    result.0.iter().map(geo_to_polygon).collect()
}

fn polygon_to_geo(poly: &Polygon) -> GeoPolygon<f64> {
    let mut ring: Vec<GeoCoord<f64>> = poly
        .points
        .iter()
        .map(|p| GeoCoord {
            x: unscale(p.x),
            y: unscale(p.y),
        })
        .collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    GeoPolygon::new(LineString::new(ring), vec![])
}

fn geo_to_polygon(geo_poly: &GeoPolygon<f64>) -> Polygon {
    let mut points: Vec<Point> = geo_poly
        .exterior()
        .coords()
        .map(|c| Point::new(scale(c.x), scale(c.y)))
        .collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    Polygon::new(points)
}
