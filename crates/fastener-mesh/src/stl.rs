//! ASCII STL export.

use std::fmt::Write as _;
use std::io::Write;

use crate::{MeshError, Result, TriangleMesh};

/// Render a mesh as an ASCII STL document.
pub fn to_stl_string(mesh: &TriangleMesh, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "solid {name}");
    for t in 0..mesh.num_triangles() {
        let n = mesh.face_normal(t);
        let _ = writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z);
        out.push_str("    outer loop\n");
        for p in mesh.triangle(t) {
            let _ = writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z);
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {name}");
    out
}

/// Write a mesh as ASCII STL.
pub fn write_stl<W: Write>(mesh: &TriangleMesh, name: &str, mut writer: W) -> Result<()> {
    if mesh.is_empty() {
        return Err(MeshError::Empty);
    }
    writer.write_all(to_stl_string(mesh, name).as_bytes())?;
    writer.flush()?;
    Ok(())
}
