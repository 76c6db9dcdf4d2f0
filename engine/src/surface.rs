//! Cutting surfaces and the raycast oracle.
//!
//! Blocks in `Cutting` mode probe the scene with rays; this module is the
//! scene. A [`CuttingSurface`] is a world-placed triangle mesh tagged with a
//! layer bit, and a [`SurfaceSet`] answers "first hit point along this ray,
//! restricted to these layers" — a miss is an ordinary `None`, never an
//! error.

use glam::{Affine3A, Vec3};

use crate::geometry::Ray;
use crate::mesh::{CollisionMesh, MeshData};

/// Layer mask matching every surface.
pub const ALL_LAYERS: u32 = u32::MAX;

/// A world-placed triangle mesh blocks can be cut against.
#[derive(Debug, Clone)]
pub struct CuttingSurface {
    collider: CollisionMesh,
    transform: Affine3A,
    layer: u32,
}

impl CuttingSurface {
    /// Creates a cutting surface from render buffers.
    ///
    /// # Arguments
    ///
    /// * `mesh` - Source geometry (copied into a collision proxy)
    /// * `transform` - Local-to-world placement of the surface
    /// * `layer` - Layer bits this surface belongs to
    pub fn new(mesh: &MeshData, transform: Affine3A, layer: u32) -> Self {
        Self {
            collider: CollisionMesh::from_mesh(mesh),
            transform,
            layer,
        }
    }

    /// The layer bits this surface belongs to.
    pub fn layer(&self) -> u32 {
        self.layer
    }

    /// First world-space hit of `ray` on this surface within `max_dist`.
    fn raycast(&self, ray: &Ray, max_dist: f32) -> Option<Vec3> {
        // Cast in surface-local space; compare distances in world space so
        // scaled transforms don't skew the cutoff.
        let to_local = self.transform.inverse();
        let local_ray = Ray::new(
            to_local.transform_point3(ray.origin),
            to_local.transform_vector3(ray.direction),
        );

        let t = self.collider.raycast(&local_ray, f32::INFINITY)?;
        let world_hit = self.transform.transform_point3(local_ray.point_at(t));

        if world_hit.distance(ray.origin) <= max_dist {
            Some(world_hit)
        } else {
            None
        }
    }
}

/// The set of surfaces a grid cuts its blocks against.
///
/// Acts as a pure, blocking collision-query oracle: every call returns
/// immediately with the closest hit or a miss, and nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSet {
    surfaces: Vec<CuttingSurface>,
}

impl SurfaceSet {
    /// Creates an empty surface set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface to the set.
    pub fn add(&mut self, surface: CuttingSurface) {
        self.surfaces.push(surface);
    }

    /// Number of surfaces in the set.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns true if the set holds no surfaces.
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Casts a ray against every surface whose layer intersects
    /// `layer_mask` and returns the closest world-space hit point.
    ///
    /// # Arguments
    ///
    /// * `ray` - World-space ray
    /// * `max_dist` - Maximum world-space distance to the hit
    /// * `layer_mask` - Only surfaces with `layer & layer_mask != 0` are
    ///   considered
    pub fn raycast(&self, ray: &Ray, max_dist: f32, layer_mask: u32) -> Option<Vec3> {
        let mut closest: Option<(f32, Vec3)> = None;

        for surface in &self.surfaces {
            if surface.layer & layer_mask == 0 {
                continue;
            }
            if let Some(hit) = surface.raycast(ray, max_dist) {
                let dist = hit.distance(ray.origin);
                if closest.is_none_or(|(best, _)| dist < best) {
                    closest = Some((dist, hit));
                }
            }
        }

        closest.map(|(_, hit)| hit)
    }
}
