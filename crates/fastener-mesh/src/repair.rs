//! Mesh repair.
//!
//! Repairs are conservative and only touch connectivity and winding:
//! - weld vertices that coincide within tolerance
//! - drop degenerate and duplicated triangles
//! - propagate a consistent winding across shared edges
//! - flip closed shells with negative volume so normals point outward
//! - recompute area-weighted vertex normals

use std::collections::{HashMap, HashSet, VecDeque};

use fastener_math::{Tolerance, Vec3};
use tracing::debug;

use crate::TriangleMesh;

/// Counters describing what [`TriangleMesh::repair`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Vertices removed by welding.
    pub welded_vertices: usize,
    /// Triangles dropped because two corners collapsed or the area vanished.
    pub degenerate_triangles: usize,
    /// Triangles dropped as exact duplicates of another triangle.
    pub duplicate_triangles: usize,
    /// Triangles whose winding was reversed.
    pub flipped_triangles: usize,
}

impl TriangleMesh {
    /// Repair the mesh in place with the default tolerance.
    pub fn repair(&mut self) -> RepairStats {
        self.repair_with(Tolerance::DEFAULT)
    }

    /// Repair the mesh in place.
    pub fn repair_with(&mut self, tolerance: Tolerance) -> RepairStats {
        let welded_vertices = weld_vertices(self, tolerance.linear);
        let (degenerate_triangles, duplicate_triangles) =
            remove_bad_triangles(self, tolerance.linear);
        let mut stats = RepairStats {
            welded_vertices,
            degenerate_triangles,
            duplicate_triangles,
            flipped_triangles: orient_consistently(self),
        };
        if self.volume() < 0.0 {
            flip_all(self);
            stats.flipped_triangles = self.num_triangles() - stats.flipped_triangles;
        }
        compute_normals(self);
        debug!(
            welded = stats.welded_vertices,
            degenerate = stats.degenerate_triangles,
            duplicate = stats.duplicate_triangles,
            flipped = stats.flipped_triangles,
            triangles = self.num_triangles(),
            "Repaired mesh"
        );
        stats
    }
}

fn quantize(v: f32, cell: f64) -> i64 {
    (v as f64 / cell).round() as i64
}

fn weld_vertices(mesh: &mut TriangleMesh, tolerance: f64) -> usize {
    let cell = tolerance.max(f64::MIN_POSITIVE);
    let mut lookup: HashMap<[i64; 3], u32> = HashMap::new();
    let mut remap = Vec::with_capacity(mesh.num_vertices());
    let mut vertices = Vec::with_capacity(mesh.vertices.len());

    for v in mesh.vertices.chunks_exact(3) {
        let key = [quantize(v[0], cell), quantize(v[1], cell), quantize(v[2], cell)];
        let idx = *lookup.entry(key).or_insert_with(|| {
            vertices.extend_from_slice(v);
            (vertices.len() / 3 - 1) as u32
        });
        remap.push(idx);
    }

    let removed = mesh.num_vertices() - vertices.len() / 3;
    for i in &mut mesh.indices {
        *i = remap[*i as usize];
    }
    mesh.vertices = vertices;
    mesh.normals.clear();
    removed
}

fn remove_bad_triangles(mesh: &mut TriangleMesh, tolerance: f64) -> (usize, usize) {
    let mut degenerate = 0;
    let mut duplicate = 0;
    let mut seen: HashSet<[u32; 3]> = HashSet::new();
    let mut kept = Vec::with_capacity(mesh.indices.len());

    for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        if a == b || b == c || a == c {
            degenerate += 1;
            continue;
        }
        let [p0, p1, p2] = mesh.triangle(t);
        if (p1 - p0).cross(&(p2 - p0)).norm() <= tolerance * tolerance {
            degenerate += 1;
            continue;
        }
        let mut key = [a, b, c];
        key.sort_unstable();
        if !seen.insert(key) {
            duplicate += 1;
            continue;
        }
        kept.extend_from_slice(tri);
    }

    mesh.indices = kept;
    (degenerate, duplicate)
}

/// Flood-fill winding across manifold edges. Returns number of flips.
fn orient_consistently(mesh: &mut TriangleMesh) -> usize {
    let n = mesh.num_triangles();
    let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
    for t in 0..n {
        for k in 0..3 {
            let a = mesh.indices[t * 3 + k];
            let b = mesh.indices[t * 3 + (k + 1) % 3];
            edge_faces.entry((a.min(b), a.max(b))).or_default().push(t);
        }
    }

    let mut visited = vec![false; n];
    let mut flipped = 0;
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(t) = queue.pop_front() {
            for k in 0..3 {
                let a = mesh.indices[t * 3 + k];
                let b = mesh.indices[t * 3 + (k + 1) % 3];
                let Some(neighbors) = edge_faces.get(&(a.min(b), a.max(b))) else {
                    continue;
                };
                // Non-manifold edges carry no winding information
                if neighbors.len() != 2 {
                    continue;
                }
                for &u in neighbors {
                    if u == t || visited[u] {
                        continue;
                    }
                    if has_directed_edge(mesh, u, a, b) {
                        mesh.indices.swap(u * 3 + 1, u * 3 + 2);
                        flipped += 1;
                    }
                    visited[u] = true;
                    queue.push_back(u);
                }
            }
        }
    }

    flipped
}

fn has_directed_edge(mesh: &TriangleMesh, t: usize, a: u32, b: u32) -> bool {
    (0..3).any(|k| mesh.indices[t * 3 + k] == a && mesh.indices[t * 3 + (k + 1) % 3] == b)
}

fn flip_all(mesh: &mut TriangleMesh) {
    for tri in mesh.indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

fn compute_normals(mesh: &mut TriangleMesh) {
    let mut acc = vec![Vec3::zeros(); mesh.num_vertices()];
    for t in 0..mesh.num_triangles() {
        let [a, b, c] = mesh.triangle(t);
        // Cross product length is twice the area, which is the weight we want
        let n = (b - a).cross(&(c - a));
        for k in 0..3 {
            acc[mesh.indices[t * 3 + k] as usize] += n;
        }
    }
    mesh.normals = acc
        .into_iter()
        .flat_map(|n| {
            let n = n.try_normalize(1e-20).unwrap_or_else(Vec3::zeros);
            [n.x as f32, n.y as f32, n.z as f32]
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::cube_facets;
    use approx::assert_relative_eq;
    use fastener_math::Point3;

    #[test]
    fn test_repair_welds_cube() {
        let mut mesh = TriangleMesh::from_facets(&cube_facets(1.0));
        let stats = mesh.repair();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(stats.welded_vertices, 28);
        assert_eq!(mesh.num_triangles(), 12);
        assert!(mesh.is_closed());
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }

    #[test]
    fn test_repair_fixes_inconsistent_winding() {
        let mut facets = cube_facets(1.0);
        facets[3].swap(1, 2);
        facets[7].swap(1, 2);
        let mut mesh = TriangleMesh::from_facets(&facets);
        let stats = mesh.repair();
        assert!(mesh.is_closed());
        assert_eq!(stats.flipped_triangles, 2);
        assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_repair_turns_inside_out_shell_outward() {
        let mut facets = cube_facets(1.0);
        for f in &mut facets {
            f.swap(1, 2);
        }
        let mut mesh = TriangleMesh::from_facets(&facets);
        assert!(mesh.volume() < 0.0);
        mesh.repair();
        assert_relative_eq!(mesh.volume(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_repair_drops_degenerate_and_duplicates() {
        let mut facets = cube_facets(1.0);
        facets.push(facets[0]);
        let p = Point3::new(0.5, 0.5, 0.5);
        facets.push([p, p, Point3::new(0.7, 0.5, 0.5)]);
        let mut mesh = TriangleMesh::from_facets(&facets);
        let stats = mesh.repair();
        assert_eq!(stats.duplicate_triangles, 1);
        assert_eq!(stats.degenerate_triangles, 1);
        assert_eq!(mesh.num_triangles(), 12);
    }

    #[test]
    fn test_open_box_stays_open() {
        let mut facets = cube_facets(1.0);
        facets.truncate(11);
        let mut mesh = TriangleMesh::from_facets(&facets);
        mesh.repair();
        assert!(!mesh.is_closed());
    }
}
