//! Wavefront OBJ export for generated diffuser meshes.
//!
//! Writes `v`/`vn`/`f` records with 1-based indices. Enough for dropping a
//! generated panel into any DCC tool; materials and UVs are out of scope.

use std::io::{self, Write};

use super::MeshData;

/// Writes a mesh as Wavefront OBJ.
///
/// Faces reference both position and normal (`f v//vn ...`); the two streams
/// are index-aligned because [`MeshData`] keeps one normal per vertex.
pub fn write_obj<W: Write>(mesh: &MeshData, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "# diffuser_creator generated mesh")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangle_count()
    )?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for n in &mesh.normals {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.triangles.chunks_exact(3) {
        // OBJ indices are 1-based.
        writeln!(
            writer,
            "f {0}//{0} {1}//{1} {2}//{2}",
            tri[0] + 1,
            tri[1] + 1,
            tri[2] + 1
        )?;
    }

    Ok(())
}
