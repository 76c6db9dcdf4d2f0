//! Mesh buffers and the collision proxy.
//!
//! [`MeshData`] is the render-facing sink: positions, triangle indices and
//! recomputed vertex normals. [`CollisionMesh`] is the physics-facing sink
//! built from the identical buffers, so visual and collision geometry can
//! never diverge — a block rebuild replaces both in one call.

pub mod obj;

pub use obj::write_obj;

use glam::{Affine3A, Vec3};

use crate::geometry::{Ray, ray_triangle_intersection};

/// Vertex/triangle/normal buffers for one mesh.
///
/// A rebuild is never incremental: [`MeshData::replace`] swaps the full
/// contents and recomputes normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Triangle indices, three per triangle
    pub triangles: Vec<u32>,
    /// Per-vertex normals, recomputed from the triangle list
    pub normals: Vec<Vec3>,
}

impl MeshData {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all geometry.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
        self.normals.clear();
    }

    /// Replaces the full vertex and triangle buffers and recomputes normals.
    pub fn replace(&mut self, vertices: &[Vec3], triangles: &[u32]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.triangles.clear();
        self.triangles.extend_from_slice(triangles);
        self.recalculate_normals();
    }

    /// Recomputes per-vertex normals from the triangle list.
    ///
    /// Each triangle's (area-weighted) face normal is accumulated onto its
    /// three vertices, then every vertex normal is normalized. Vertices
    /// shared between triangles get smoothed normals; duplicated vertices
    /// (as in the per-face cuboid layout) keep their face normal.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vec3::ZERO);

        for tri in self.triangles.chunks_exact(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let edge1 = self.vertices[i1] - self.vertices[i0];
            let edge2 = self.vertices[i2] - self.vertices[i0];
            // Cross product length is twice the triangle area, which gives
            // the area weighting for free.
            let face_normal = edge1.cross(edge2);

            self.normals[i0] += face_normal;
            self.normals[i1] += face_normal;
            self.normals[i2] += face_normal;
        }

        for normal in &mut self.normals {
            *normal = normal.normalize_or_zero();
        }
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// Physics collision proxy over the same vertex/triangle buffers as the
/// render mesh.
///
/// Supports raycast queries via Möller–Trumbore over every triangle; fine
/// for the small fixed-topology meshes this crate produces.
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<u32>,
}

impl CollisionMesh {
    /// Creates an empty collision mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collision geometry with the given buffers.
    pub fn replace(&mut self, vertices: &[Vec3], triangles: &[u32]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.triangles.clear();
        self.triangles.extend_from_slice(triangles);
    }

    /// Builds a collision mesh directly from render buffers.
    pub fn from_mesh(mesh: &MeshData) -> Self {
        Self {
            vertices: mesh.vertices.clone(),
            triangles: mesh.triangles.clone(),
        }
    }

    /// Returns true if the proxy holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Casts a ray against every triangle and returns the nearest hit
    /// distance within `max_dist`, or `None` on a miss.
    pub fn raycast(&self, ray: &Ray, max_dist: f32) -> Option<f32> {
        let mut nearest: Option<f32> = None;

        for tri in self.triangles.chunks_exact(3) {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];

            if let Some(t) = ray_triangle_intersection(ray, v0, v1, v2) {
                if t <= max_dist && nearest.is_none_or(|n| t < n) {
                    nearest = Some(t);
                }
            }
        }

        nearest
    }
}

/// Bakes several meshes through their local-to-world transforms into one
/// combined buffer.
///
/// Normals are transformed by the rotation/scale part of each transform and
/// renormalized; indices are offset past previously appended vertices.
pub fn combine(parts: &[(&MeshData, Affine3A)]) -> MeshData {
    let mut combined = MeshData::new();

    for (mesh, transform) in parts {
        let base = combined.vertices.len() as u32;

        combined
            .vertices
            .extend(mesh.vertices.iter().map(|v| transform.transform_point3(*v)));
        combined.normals.extend(
            mesh.normals
                .iter()
                .map(|n| transform.transform_vector3(*n).normalize_or_zero()),
        );
        combined
            .triangles
            .extend(mesh.triangles.iter().map(|i| i + base));
    }

    combined
}
