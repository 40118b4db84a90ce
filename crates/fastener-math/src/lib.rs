#![warn(missing_docs)]

//! Math types for fastener placement.
//!
//! Thin wrappers around nalgebra providing the points, vectors and
//! transforms used by the mesh and polygon crates, the fixed-point
//! scale shared with the polygon library, and tolerance constants.

use nalgebra::{Matrix4, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in 2D space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Integer coordinate on the fixed-point grid.
pub type Coord = i64;

/// Fixed-point resolution: one model unit (mm) is stored as this many
/// integer units, i.e. 1 unit = 1 nm.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Linear tolerance (model units) for height boundary tests.
pub const EPSILON: f64 = 1e-4;

/// Scale a model-unit value onto the integer grid.
#[inline]
pub fn scale(v: f64) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Convert an integer grid value back to model units.
#[inline]
pub fn unscale(v: Coord) -> f64 {
    v as f64 / SCALING_FACTOR
}

/// Degrees to radians.
#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg.to_radians()
}

/// Rotation angles in degrees about the x, y and z axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation about X (degrees).
    pub x: f64,
    /// Rotation about Y (degrees).
    pub y: f64,
    /// Rotation about Z, the yaw (degrees).
    pub z: f64,
}

impl Rotation {
    /// Create a rotation from three angles in degrees.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Yaw-only rotation.
    pub fn yaw(z: f64) -> Self {
        Self { x: 0.0, y: 0.0, z }
    }
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a normal vector (uses inverse transpose of upper-left 3x3).
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        let m3 = self.matrix.fixed_view::<3, 3>(0, 0);
        if let Some(inv) = m3.try_inverse() {
            inv.transpose() * n
        } else {
            // Singular matrix: leave the normal as is
            *n
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
}

impl Tolerance {
    /// Default mesh tolerance (1e-6 mm).
    pub const DEFAULT: Self = Self { linear: 1e-6 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
