#![warn(missing_docs)]

//! Triangle mesh container for fastener bodies.
//!
//! Meshes are built from loose facets, repaired into a welded, consistently
//! wound solid, and then moved into place with rigid transforms. The ASCII
//! STL writer in [`stl`] is used for export.

pub mod repair;
pub mod stl;

use fastener_math::{Point3, Transform, Vec3};
use thiserror::Error;

pub use repair::RepairStats;
pub use stl::{to_stl_string, write_stl};

/// A triangle given by three corner points.
pub type Facet = [Point3; 3];

/// Errors from mesh export.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Writing the output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh has no triangles to write.
    #[error("mesh is empty")]
    Empty,
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Indexed triangle mesh.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
    /// Flat array of vertex normals: `[nx0, ny0, nz0, ...]` (f32). Same length as vertices
    /// once the mesh is repaired, empty before.
    pub normals: Vec<f32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
        }
    }

    /// Build an unwelded mesh from loose facets (three vertices per facet).
    pub fn from_facets(facets: &[Facet]) -> Self {
        let mut mesh = Self::new();
        mesh.vertices.reserve(facets.len() * 9);
        mesh.indices.reserve(facets.len() * 3);
        for facet in facets {
            for p in facet {
                let idx = mesh.num_vertices() as u32;
                mesh.vertices
                    .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
                mesh.indices.push(idx);
            }
        }
        mesh
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Check if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Point3 {
        Point3::new(
            self.vertices[i * 3] as f64,
            self.vertices[i * 3 + 1] as f64,
            self.vertices[i * 3 + 2] as f64,
        )
    }

    /// Corner points of triangle `t`.
    pub fn triangle(&self, t: usize) -> Facet {
        [
            self.vertex(self.indices[t * 3] as usize),
            self.vertex(self.indices[t * 3 + 1] as usize),
            self.vertex(self.indices[t * 3 + 2] as usize),
        ]
    }

    /// Iterate over all triangles as corner points.
    pub fn triangles(&self) -> impl Iterator<Item = Facet> + '_ {
        (0..self.num_triangles()).map(move |t| self.triangle(t))
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Apply an affine transform to vertices and normals.
    pub fn transform(&mut self, t: &Transform) {
        for v in self.vertices.chunks_exact_mut(3) {
            let p = t.apply_point(&Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
            v[0] = p.x as f32;
            v[1] = p.y as f32;
            v[2] = p.z as f32;
        }
        for n in self.normals.chunks_exact_mut(3) {
            let r = t.apply_normal(&Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64));
            let r = r.try_normalize(1e-12).unwrap_or(r);
            n[0] = r.x as f32;
            n[1] = r.y as f32;
            n[2] = r.z as f32;
        }
    }

    /// Rotate about the X axis through the local origin by `angle` radians.
    pub fn rotate_x(&mut self, angle: f64) {
        self.transform(&Transform::rotation_x(angle));
    }

    /// Rotate about the Y axis through the local origin by `angle` radians.
    pub fn rotate_y(&mut self, angle: f64) {
        self.transform(&Transform::rotation_y(angle));
    }

    /// Rotate about the Z axis through the local origin by `angle` radians.
    pub fn rotate_z(&mut self, angle: f64) {
        self.transform(&Transform::rotation_z(angle));
    }

    /// Translate by `(dx, dy, dz)`.
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.transform(&Transform::translation(dx, dy, dz));
    }

    /// Axis-aligned bounding box `(min, max)`, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in self.vertices.chunks_exact(3) {
            for k in 0..3 {
                min[k] = min[k].min(v[k] as f64);
                max[k] = max[k].max(v[k] as f64);
            }
        }
        Some((
            Point3::new(min[0], min[1], min[2]),
            Point3::new(max[0], max[1], max[2]),
        ))
    }

    /// Signed volume (positive when triangles wind outward).
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum()
    }

    /// Unit face normal of triangle `t` (zero for degenerate triangles).
    pub fn face_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t);
        let n = (b - a).cross(&(c - a));
        n.try_normalize(1e-20).unwrap_or_else(Vec3::zeros)
    }

    /// True when every edge is shared by exactly two triangles traversing it
    /// in opposite directions (watertight and consistently oriented).
    pub fn is_closed(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut directed = std::collections::HashMap::new();
        for tri in self.indices.chunks_exact(3) {
            for k in 0..3 {
                let e = (tri[k], tri[(k + 1) % 3]);
                *directed.entry(e).or_insert(0u32) += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
