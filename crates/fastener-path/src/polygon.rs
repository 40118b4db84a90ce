//! Integer point and closed polygon types.

use fastener_math::{scale, unscale, Coord, Point2};
use serde::{Deserialize, Serialize};

/// A point on the fixed-point grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (scaled).
    pub x: Coord,
    /// Y coordinate (scaled).
    pub y: Coord,
}

impl Point {
    /// Create a point from scaled coordinates.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Create a point from model-unit coordinates.
    pub fn new_scale(x: f64, y: f64) -> Self {
        Self::new(scale(x), scale(y))
    }

    /// Back to model units.
    pub fn unscaled(&self) -> Point2 {
        Point2::new(unscale(self.x), unscale(self.y))
    }

    /// Rotate about `center` by `angle` radians, rounding onto the grid.
    pub fn rotated(&self, angle: f64, center: Point) -> Self {
        let (s, c) = angle.sin_cos();
        let dx = (self.x - center.x) as f64;
        let dy = (self.y - center.y) as f64;
        Self::new(
            (center.x as f64 + c * dx - s * dy).round() as Coord,
            (center.y as f64 + c * dy + s * dx).round() as Coord,
        )
    }
}

/// A closed polygon. The closing edge is implicit; the first point is not repeated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build from model-unit points.
    pub fn from_unscaled(points: &[Point2]) -> Self {
        Self::new(points.iter().map(|p| Point::new_scale(p.x, p.y)).collect())
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Vertices in model units.
    pub fn unscaled(&self) -> Vec<Point2> {
        self.points.iter().map(Point::unscaled).collect()
    }

    /// Signed area in scaled units squared.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area: i128 = 0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x as i128 * self.points[j].y as i128;
            area -= self.points[j].x as i128 * self.points[i].y as i128;
        }
        area as f64 / 2.0
    }

    /// Absolute area in model units squared.
    pub fn area(&self) -> f64 {
        let s = fastener_math::SCALING_FACTOR;
        self.signed_area().abs() / (s * s)
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Ensure counter-clockwise winding.
    pub fn ensure_ccw(&mut self) {
        if !self.is_ccw() {
            self.reverse();
        }
    }

    /// True when every turn has the same sign (collinear runs allowed).
    pub fn is_convex(&self) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0i8;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let c = self.points[(i + 2) % n];
            let cross = (b.x - a.x) as i128 * (c.y - b.y) as i128
                - (b.y - a.y) as i128 * (c.x - b.x) as i128;
            let s = cross.signum() as i8;
            if s == 0 {
                continue;
            }
            if sign == 0 {
                sign = s;
            } else if s != sign {
                return false;
            }
        }
        sign != 0
    }

    /// Vertex average in model units.
    pub fn centroid(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::origin();
        }
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(x, y), p| (x + unscale(p.x), y + unscale(p.y)));
        let n = self.points.len() as f64;
        Point2::new(sx / n, sy / n)
    }

    /// Bounding box `(min, max)` in scaled units, `None` when empty.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Check if a point is strictly inside (even-odd rule).
    pub fn contains(&self, point: &Point) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let (px, py) = (point.x as f64, point.y as f64);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (self.points[i].x as f64, self.points[i].y as f64);
            let (xj, yj) = (self.points[j].x as f64, self.points[j].y as f64);
            if ((yi > py) != (yj > py)) && (px < (xj - xi) * (py - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Rotate every vertex about `center` by `angle` radians.
    pub fn rotate(&mut self, angle: f64, center: Point) {
        for p in &mut self.points {
            *p = p.rotated(angle, center);
        }
    }

    /// Translate by scaled offsets.
    pub fn translate(&mut self, dx: Coord, dy: Coord) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn square(side: f64) -> Polygon {
        Polygon::from_unscaled(&[
            Point2::new(0.0, 0.0),
            Point2::new(side, 0.0),
            Point2::new(side, side),
            Point2::new(0.0, side),
        ])
    }

    #[test]
    fn test_polygon_area() {
        let sq = square(1.0);
        assert_relative_eq!(sq.area(), 1.0, epsilon = 1e-12);
        assert!(sq.is_ccw());
        assert!(sq.is_convex());
    }

    #[test]
    fn test_reverse_winding() {
        let mut sq = square(2.0);
        sq.reverse();
        assert!(!sq.is_ccw());
        sq.ensure_ccw();
        assert!(sq.is_ccw());
    }

    #[test]
    fn test_rotate_about_origin() {
        let mut p = Polygon::new(vec![Point::new_scale(1.0, 0.0)]);
        p.rotate(PI / 2.0, Point::default());
        assert_eq!(p.points[0], Point::new(0, 1_000_000));
    }

    #[test]
    fn test_translate_and_bbox() {
        let mut sq = square(10.0);
        sq.translate(Point::new_scale(5.0, 0.0).x, 0);
        let (lo, hi) = sq.bounding_box().unwrap();
        assert_eq!(lo, Point::new_scale(5.0, 0.0));
        assert_eq!(hi, Point::new_scale(15.0, 10.0));
        let c = sq.centroid();
        assert_relative_eq!(c.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_contains() {
        let sq = square(10.0);
        assert!(sq.contains(&Point::new_scale(5.0, 5.0)));
        assert!(!sq.contains(&Point::new_scale(15.0, 5.0)));
        assert!(!sq.contains(&Point::new_scale(-1.0, 5.0)));
    }

    #[test]
    fn test_concave_is_not_convex() {
        let l = Polygon::from_unscaled(&[
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        assert!(!l.is_convex());
        assert!(Polygon::default().bounding_box().is_none());
    }
}
