//! Clearance hull of a part for one print-height interval.
//!
//! The hull is the region a layer's toolpaths must keep away from so the
//! nut can still be inserted later. It is built in the part's local frame,
//! reduced to its convex hull, grown by the clearance with square joins,
//! then yawed about the world origin and moved onto the destination.

use fastener_math::{deg2rad, scale, Point2};
use fastener_path::{convex_hull, offset, OffsetJoinType, Point, Polygon};
use tracing::debug;

use crate::orientation::PartOrientation;
use crate::part::Part;

/// Lead-in chamfer angle of an upright nut's lower half, in degrees.
const LEAD_IN_ANGLE_DEG: f64 = 120.0;

/// Samples on the circumscribed circle of a flat nut.
const FLAT_OUTLINE_SAMPLES: u32 = 6;

impl PartOrientation {
    /// Outline points in the part's local frame for an interval starting at
    /// `z_lower`, before hull reduction and offsetting.
    pub fn outline(self, origin: Point2, size: &[f64; 3], base_z: f64, z_lower: f64) -> Vec<Point> {
        match self {
            PartOrientation::Upright => upright_outline(origin, size, base_z, z_lower),
            PartOrientation::Flat => flat_outline(origin, size[0] / 2.0),
        }
    }
}

/// Cross-section of an upright nut, in (x, z) with z on the second axis.
///
/// Below the midpoint the nut's lower corners taper, so the half-width
/// starts at `radius / 2` and widens as the interval climbs.
fn upright_outline(origin: Point2, size: &[f64; 3], base_z: f64, z_lower: f64) -> Vec<Point> {
    let radius = size[0] / 2.0;
    let width = size[2];
    let (x, z) = (origin.x, origin.y);

    let half = if z_lower < base_z + size[1] / 2.0 {
        let height = base_z - z_lower;
        radius / 2.0 + height / deg2rad(LEAD_IN_ANGLE_DEG).tan()
    } else {
        radius
    };

    vec![
        Point::new_scale(x + half, z - width),
        Point::new_scale(x + half, z),
        Point::new_scale(x - half, z - width),
        Point::new_scale(x - half, z),
    ]
}

/// Hexagon with its corners on the circle of `radius` around `origin`.
fn flat_outline(origin: Point2, radius: f64) -> Vec<Point> {
    let step = 360 / FLAT_OUTLINE_SAMPLES;
    (1..=FLAT_OUTLINE_SAMPLES)
        .map(|i| {
            let angle = deg2rad((i * step) as f64);
            Point::new_scale(origin.x + angle.sin() * radius, origin.y + angle.cos() * radius)
        })
        .collect()
}

impl Part {
    /// Clearance hull for print heights `[z_lower, z_upper)` in world
    /// coordinates on the fixed-point grid, grown by `clearance` model units.
    ///
    /// Empty when the interval does not touch the part.
    pub fn hull_polygon(&self, z_lower: f64, z_upper: f64, clearance: f64) -> Polygon {
        let base_z = self.position.z;
        if !self.orientation.affects(base_z, &self.size(), z_lower, z_upper) {
            return Polygon::default();
        }

        let outline = self.orientation.outline(self.origin(), &self.size(), base_z, z_lower);
        let hull = convex_hull(&outline);
        let Some(mut result) = offset(&hull, clearance, OffsetJoinType::Square)
            .into_iter()
            .next()
        else {
            return Polygon::default();
        };

        let yaw = deg2rad(self.rotation.z);
        result.rotate(yaw, Point::default());
        let pivot = self.orientation.pivot_offset(&self.size(), yaw);
        result.translate(
            scale(self.position.x + pivot.x),
            scale(self.position.y + pivot.y),
        );

        debug!(
            part_id = self.part_id(),
            z_lower,
            z_upper,
            points = result.len(),
            "Computed clearance hull"
        );
        result
    }
}
