//! Geometric intersection primitives.
//!
//! Pure math, no state: 3D line-line intersection (used by the angle-based
//! curve deformation to find where a tilted back edge meets the block's side
//! edge) and Möller–Trumbore ray-triangle intersection (the building block
//! for raycasting against cutting surfaces).
//!
//! The line-line epsilons are tuned to the unit scale of the block meshes;
//! changing them shifts which near-degenerate configurations count as
//! intersecting.

use glam::Vec3;

/// Coplanarity threshold for [`line_line_intersection`].
///
/// Two lines are treated as coplanar when the absolute triple product of the
/// connecting vector with both direction vectors is below this value.
const COPLANAR_EPSILON: f32 = 1e-4;

/// Parallelism threshold for [`line_line_intersection`].
///
/// Two lines are treated as parallel when the squared magnitude of the cross
/// product of their directions is at or below this value.
const PARALLEL_EPSILON_SQ: f32 = 1e-4;

/// A ray with an origin and a (not necessarily normalized) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Starting point of the ray
    pub origin: Vec3,
    /// Direction the ray travels in
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at parameter `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Intersects two 3D lines, each given as a point and a direction.
///
/// The lines intersect only when they are coplanar (triple product of the
/// connecting vector and both directions within `1e-4` of zero) and not
/// parallel (squared cross-product magnitude above `1e-4`). The returned
/// point lies on line 1 at the computed parametric intersection.
///
/// # Arguments
///
/// * `point1`, `dir1` - A point on line 1 and its direction
/// * `point2`, `dir2` - A point on line 2 and its direction
///
/// # Returns
///
/// `Some(point)` where the lines cross, `None` for parallel or skew lines.
pub fn line_line_intersection(point1: Vec3, dir1: Vec3, point2: Vec3, dir2: Vec3) -> Option<Vec3> {
    let connecting = point2 - point1;
    let cross_dirs = dir1.cross(dir2);
    let planar_factor = connecting.dot(cross_dirs);

    // Coplanar and not parallel.
    if planar_factor.abs() < COPLANAR_EPSILON && cross_dirs.length_squared() > PARALLEL_EPSILON_SQ {
        let s = connecting.cross(dir2).dot(cross_dirs) / cross_dirs.length_squared();
        Some(point1 + dir1 * s)
    } else {
        None
    }
}

/// Möller–Trumbore ray-triangle intersection.
///
/// # Arguments
///
/// * `ray` - The ray to test
/// * `v0`, `v1`, `v2` - Triangle vertices
///
/// # Returns
///
/// `Some(t)` with the distance along the ray to the hit (`t > 0`), or `None`
/// if the ray misses the triangle or runs parallel to its plane.
pub fn ray_triangle_intersection(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray parallel to the triangle plane.
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > EPSILON { Some(t) } else { None }
}
