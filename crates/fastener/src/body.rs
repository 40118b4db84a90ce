//! Solid bodies for rendering and export.

use fastener_math::{deg2rad, Point3};
use fastener_mesh::{Facet, TriangleMesh};

use crate::part::Part;

/// Twelve facets of the axis-aligned box `min .. min + dims`, two per face.
fn prism_facets(min: Point3, dims: [f64; 3]) -> [Facet; 12] {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (x0 + dims[0], y0 + dims[1], z0 + dims[2]);
    let p = Point3::new;
    [
        // bottom
        [p(x0, y0, z0), p(x1, y1, z0), p(x1, y0, z0)],
        [p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0)],
        // top
        [p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1)],
        [p(x0, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
        // front (y0)
        [p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1)],
        [p(x0, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
        // back (y1)
        [p(x1, y1, z0), p(x0, y1, z0), p(x0, y1, z1)],
        [p(x1, y1, z0), p(x0, y1, z1), p(x1, y1, z1)],
        // left (x0)
        [p(x0, y1, z0), p(x0, y0, z0), p(x0, y0, z1)],
        [p(x0, y1, z0), p(x0, y0, z1), p(x0, y1, z1)],
        // right (x1)
        [p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1)],
        [p(x1, y0, z0), p(x1, y1, z1), p(x1, y0, z1)],
    ]
}

impl Part {
    /// Solid body of the part in world coordinates.
    ///
    /// A prism of `size[0] × size[1] × (size[2] − footprint_height)`,
    /// centred on the origin in x and y with its base at local z = 0, is
    /// repaired, rotated about x, then y, then z, and finally moved onto the
    /// destination. The pivot offset uses the same yaw as the rotation.
    pub fn body_mesh(&self) -> TriangleMesh {
        let size = self.size();
        let origin = self.origin();
        let height = size[2] - self.footprint_height();
        let min = Point3::new(origin.x - size[0] / 2.0, origin.y - size[1] / 2.0, 0.0);

        let mut mesh = TriangleMesh::from_facets(&prism_facets(min, [size[0], size[1], height]));
        mesh.repair();

        mesh.rotate_x(deg2rad(self.rotation.x));
        mesh.rotate_y(deg2rad(self.rotation.y));
        let yaw = deg2rad(self.rotation.z);
        mesh.rotate_z(yaw);

        let pivot = self.orientation.pivot_offset(&size, yaw);
        let lift = self.orientation.body_lift(&size, self.footprint_height());
        mesh.translate(
            self.position.x + pivot.x,
            self.position.y + pivot.y,
            self.position.z + lift,
        );
        mesh
    }
}

/// The twelve facets of a square nut: a `diameter × diameter × height` box
/// with its bottom face centred on `(x, y, z)`.
///
/// Two triangles per face, in the order ground, cover, left, bottom (−y),
/// right, top (+y). Windings are as laid out per face and are made
/// consistent by [`square_nut_body`].
pub fn square_nut_facets(x: f64, y: f64, z: f64, diameter: f64, height: f64) -> [Facet; 12] {
    let r = diameter / 2.0;
    let p = Point3::new;
    let (xl, xh, yl, yh, zt) = (x - r, x + r, y - r, y + r, z + height);
    [
        // ground
        [p(xl, yl, z), p(xl, yh, z), p(xh, yh, z)],
        [p(xl, yl, z), p(xh, yh, z), p(xh, yl, z)],
        // cover
        [p(xl, yl, zt), p(xl, yh, zt), p(xh, yh, zt)],
        [p(xl, yl, zt), p(xh, yh, zt), p(xh, yl, zt)],
        // left
        [p(xl, yl, z), p(xl, yh, z), p(xl, yh, zt)],
        [p(xl, yl, zt), p(xl, yh, zt), p(xl, yl, z)],
        // bottom
        [p(xl, yl, z), p(xh, yl, z), p(xh, yl, zt)],
        [p(xl, yl, zt), p(xh, yl, zt), p(xl, yl, z)],
        // right
        [p(xh, yl, z), p(xh, yh, z), p(xh, yh, zt)],
        [p(xh, yl, zt), p(xh, yh, zt), p(xh, yl, z)],
        // top
        [p(xl, yh, z), p(xh, yh, z), p(xh, yh, zt)],
        [p(xl, yh, zt), p(xh, yh, zt), p(xl, yh, z)],
    ]
}

/// Watertight square nut body at explicit world coordinates, independent of
/// any part's orientation or rotation.
pub fn square_nut_body(x: f64, y: f64, z: f64, diameter: f64, height: f64) -> TriangleMesh {
    let mut mesh = TriangleMesh::from_facets(&square_nut_facets(x, y, z, diameter, height));
    mesh.repair();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::PartOrientation;
    use approx::assert_relative_eq;
    use fastener_math::{Point2, Rotation};

    fn part() -> Part {
        Part::new(1, "n", Point2::new(0.0, 0.0), [10.0, 20.0, 5.0])
            .with_position(Point3::new(100.0, 100.0, 0.0))
    }

    fn assert_bounds(mesh: &TriangleMesh, min: [f64; 3], max: [f64; 3]) {
        let (lo, hi) = mesh.bounds().unwrap();
        for k in 0..3 {
            assert_relative_eq!(lo[k], min[k], epsilon = 1e-4);
            assert_relative_eq!(hi[k], max[k], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_flat_body_sits_on_destination() {
        let mesh = part().body_mesh();
        assert_eq!(mesh.num_triangles(), 12);
        assert!(mesh.is_closed());
        assert_bounds(&mesh, [95.0, 90.0, 0.0], [105.0, 110.0, 5.0]);
        assert_relative_eq!(mesh.volume(), 1000.0, epsilon = 1e-1);
    }

    #[test]
    fn test_footprint_height_lifts_and_shortens() {
        let mesh = part().with_footprint_height(1.0).body_mesh();
        assert_bounds(&mesh, [95.0, 90.0, 1.0], [105.0, 110.0, 5.0]);
    }

    #[test]
    fn test_flat_yaw() {
        let mesh = part().with_rotation(Rotation::yaw(90.0)).body_mesh();
        assert_bounds(&mesh, [90.0, 95.0, 0.0], [110.0, 105.0, 5.0]);
    }

    #[test]
    fn test_tilt_applied_before_translation() {
        let mesh = part().with_rotation(Rotation::new(90.0, 0.0, 0.0)).body_mesh();
        assert_bounds(&mesh, [95.0, 95.0, -10.0], [105.0, 100.0, 10.0]);
    }

    #[test]
    fn test_upright_body_offsets() {
        let upright = Part::new(2, "u", Point2::origin(), [10.0, 20.0, 4.0])
            .with_orientation(PartOrientation::Upright);
        let mesh = upright.body_mesh();
        assert_bounds(&mesh, [-5.0, -8.0, 10.0], [5.0, 12.0, 14.0]);
    }

    #[test]
    fn test_upright_rotates_before_pivot_translation() {
        let upright = Part::new(2, "u", Point2::origin(), [10.0, 20.0, 4.0])
            .with_orientation(PartOrientation::Upright)
            .with_rotation(Rotation::yaw(90.0));
        let mesh = upright.body_mesh();
        assert_bounds(&mesh, [-12.0, -5.0, 10.0], [8.0, 5.0, 14.0]);
    }

    #[test]
    fn test_square_nut_emits_every_face() {
        let facets = square_nut_facets(0.0, 0.0, 0.0, 4.0, 2.0);
        assert_eq!(facets.len(), 12);
        let cover = facets
            .iter()
            .filter(|f| f.iter().all(|p| (p.z - 2.0).abs() < 1e-12))
            .count();
        assert_eq!(cover, 2);
    }

    #[test]
    fn test_square_nut_body_is_watertight() {
        let mesh = square_nut_body(10.0, 20.0, 1.0, 4.0, 2.0);
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.num_vertices(), 8);
        assert!(mesh.is_closed());
        assert_relative_eq!(mesh.volume(), 32.0, epsilon = 1e-4);
        assert_bounds(&mesh, [8.0, 18.0, 1.0], [12.0, 22.0, 3.0]);
    }
}
