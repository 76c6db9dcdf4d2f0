//! Diffuser block shape engine.
//!
//! A block is a parametric cuboid: the front face is always the unit square
//! at z=0, and the four back-face corners are pushed along local -Z by
//! per-corner depths. Depths come from raycasting against cutting surfaces,
//! from curve evaluation across the owning grid, or from manual edits,
//! depending on the block's editing mode. Every depth change rebuilds both
//! the render mesh and the collision proxy from the same buffers.
//!
//! # Corner indexing
//!
//! Looking at the front face, corners are counted counter-clockwise from
//! bottom-right:
//!
//! ```text
//!   2 ---- 1        depths[0] - bottom-right
//!   |      |        depths[1] - top-right
//!   |      |        depths[2] - top-left
//!   3 ---- 0        depths[3] - bottom-left
//! ```
//!
//! Points 0-3 are the front face; points 4-7 sit behind them at
//! `z = -depths[i]`.

mod indicator;

pub use indicator::VertexIndicator;

use glam::{Affine3A, Quat, Vec2, Vec3};
use log::{debug, warn};

use crate::curve::{CurveMode, CurveOrientation, SharedCurve};
use crate::error::Error;
use crate::geometry::{Ray, line_line_intersection};
use crate::mesh::{CollisionMesh, MeshData};
use crate::surface::SurfaceSet;

/// Back-face depth a corner falls back to when a cutting probe misses.
pub const DEFAULT_DEPTH: f32 = 1.0;

/// How raycast results are distributed over the four back corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HeightMode {
    /// One probe from the block center; uniform depth
    Middle,
    /// Four probes, one per corner, each independent
    Corner,
    /// Two probes at the right/left edge midpoints; corner pairs (0,1)
    /// and (2,3) share a depth
    Horizontal,
    /// Two probes at the bottom/top edge midpoints; corner pairs (0,3)
    /// and (1,2) share a depth
    Vertical,
}

/// Which update path is allowed to mutate corner depths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EditingMode {
    /// Depths come from raycasting against cutting surfaces
    Cutting,
    /// Depths come from curve evaluation
    Curve,
    /// Depths are set manually per corner
    Custom,
}

/// Front-face corner points, fixed for the lifetime of every block.
const FRONT_POINTS: [Vec3; 4] = [
    Vec3::new(0.5, -0.5, 0.0),  // 0: bottom-right
    Vec3::new(0.5, 0.5, 0.0),   // 1: top-right
    Vec3::new(-0.5, 0.5, 0.0),  // 2: top-left
    Vec3::new(-0.5, -0.5, 0.0), // 3: bottom-left
];

/// Which 4 of the 8 corner points each cuboid face draws from.
///
/// The grouping (and the triangle winding below) must stay exactly like
/// this: together with recomputed normals it yields outward-facing normals
/// on all six faces.
const FACE_POINTS: [[usize; 4]; 6] = [
    [0, 1, 2, 3], // back (front face, z=0)
    [4, 5, 6, 7], // front (cut face, z=-depth)
    [2, 3, 6, 7], // left
    [0, 1, 4, 5], // right
    [1, 2, 5, 6], // top
    [0, 3, 4, 7], // bottom
];

/// Triangle winding over the 24 per-face vertices.
const TRIANGLES: [u32; 36] = [
    0, 1, 2, // back
    0, 2, 3, //
    7, 6, 5, // front
    7, 5, 4, //
    9, 8, 10, // left
    9, 10, 11, //
    13, 12, 14, // right
    13, 14, 15, //
    17, 16, 18, // top
    17, 18, 19, //
    20, 21, 23, // bottom
    20, 23, 22,
];

/// One procedurally generated cuboid cell of a diffuser grid.
#[derive(Clone)]
pub struct DiffuserBlock {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    corner_depths: [f32; 4],
    points: [Vec3; 8],
    height_mode: HeightMode,
    editing_mode: EditingMode,
    grid_position: Vec2,
    relative_grid_position: Vec2,
    initial_depth: f32,
    horizontal_curve: Option<SharedCurve>,
    vertical_curve: Option<SharedCurve>,
    diagonal_curve: Option<SharedCurve>,
    curve_mode: CurveMode,
    snap_angle: i32,
    angle: i32,
    mesh: MeshData,
    collider: CollisionMesh,
    indicators_visible: bool,
    indicators: Vec<VertexIndicator>,
}

impl DiffuserBlock {
    /// Creates an unscaled block at `position` with all depths at
    /// [`DEFAULT_DEPTH`], in `Cutting` mode with `Middle` probing.
    pub fn new(position: Vec3) -> Self {
        let mut block = Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            corner_depths: [DEFAULT_DEPTH; 4],
            points: [Vec3::ZERO; 8],
            height_mode: HeightMode::Middle,
            editing_mode: EditingMode::Cutting,
            grid_position: Vec2::ZERO,
            relative_grid_position: Vec2::splat(0.5),
            initial_depth: DEFAULT_DEPTH,
            horizontal_curve: None,
            vertical_curve: None,
            diagonal_curve: None,
            curve_mode: CurveMode::Height,
            snap_angle: 0,
            angle: 0,
            mesh: MeshData::new(),
            collider: CollisionMesh::new(),
            indicators_visible: false,
            indicators: Vec::new(),
        };
        block.points[..4].copy_from_slice(&FRONT_POINTS);
        block.rebuild();
        block
    }

    /// Wires in the grid-owned data a block needs for curve evaluation.
    ///
    /// Called once right after creation; `relative_grid_position` is
    /// immutable afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        grid_position: Vec2,
        relative_grid_position: Vec2,
        horizontal_curve: Option<SharedCurve>,
        vertical_curve: Option<SharedCurve>,
        diagonal_curve: Option<SharedCurve>,
        curve_mode: CurveMode,
        snap_angle: i32,
    ) {
        self.grid_position = grid_position;
        self.relative_grid_position = relative_grid_position;
        self.horizontal_curve = horizontal_curve;
        self.vertical_curve = vertical_curve;
        self.diagonal_curve = diagonal_curve;
        self.curve_mode = curve_mode;
        self.snap_angle = snap_angle;
    }

    /// Sets the bounding-box scale; `depth` becomes the baseline
    /// (`initial_depth`) for later curve calculations.
    pub fn set_size(&mut self, width: f32, height: f32, depth: f32) {
        self.scale = Vec3::new(width, height, depth);
        self.initial_depth = depth;
    }

    /// Local-to-world transform of this block.
    pub fn local_to_world(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    // ========================================================================
    // CUTTING
    // ========================================================================

    /// Shapes the back face by raycasting against `surfaces`.
    ///
    /// Only effective in [`EditingMode::Cutting`]. Probe origins depend on
    /// [`HeightMode`]; every probe fires along local -Z with a reach of
    /// `DEFAULT_DEPTH * scale.z`. A hit sets the affected corner depths to
    /// the hit's local -z; a miss resets them to [`DEFAULT_DEPTH`].
    pub fn cut_with_surface(&mut self, surfaces: &SurfaceSet, layer_mask: u32) {
        if self.editing_mode != EditingMode::Cutting {
            return;
        }

        let to_world = self.local_to_world();
        let to_local = to_world.inverse();
        let direction = self.rotation * Vec3::NEG_Z;
        let max_dist = DEFAULT_DEPTH * self.scale.z;

        let probe = |local_origin: Vec3| -> f32 {
            let ray = Ray::new(to_world.transform_point3(local_origin), direction);
            match surfaces.raycast(&ray, max_dist, layer_mask) {
                Some(hit) => {
                    let depth = -to_local.transform_point3(hit).z;
                    debug!("cut probe at {local_origin:?} hit, depth {depth}");
                    depth
                }
                None => {
                    debug!("cut probe at {local_origin:?} missed, default depth");
                    DEFAULT_DEPTH
                }
            }
        };

        match self.height_mode {
            HeightMode::Middle => {
                let depth = probe(Vec3::ZERO);
                self.corner_depths = [depth; 4];
            }
            HeightMode::Corner => {
                for i in 0..4 {
                    self.corner_depths[i] = probe(FRONT_POINTS[i]);
                }
            }
            HeightMode::Horizontal => {
                for [a, b] in [[0usize, 1], [2, 3]] {
                    let midpoint = (FRONT_POINTS[a] + FRONT_POINTS[b]) / 2.0;
                    let depth = probe(midpoint);
                    self.corner_depths[a] = depth;
                    self.corner_depths[b] = depth;
                }
            }
            HeightMode::Vertical => {
                for [a, b] in [[0usize, 3], [1, 2]] {
                    let midpoint = (FRONT_POINTS[a] + FRONT_POINTS[b]) / 2.0;
                    let depth = probe(midpoint);
                    self.corner_depths[a] = depth;
                    self.corner_depths[b] = depth;
                }
            }
        }

        self.rebuild();
    }

    // ========================================================================
    // CURVES
    // ========================================================================

    /// Recomputes depths from the assigned curves.
    ///
    /// Only effective in [`EditingMode::Curve`]. In `Height` mode the
    /// enabled curves' outputs are averaged into a fractional modifier of
    /// `initial_depth`, applied uniformly. In `Angle` mode the averaged
    /// curve output is a tilt in degrees turning the back face into a wedge.
    pub fn update_depth_with_curve(&mut self, curve_mode: CurveMode) {
        if self.editing_mode != EditingMode::Curve {
            return;
        }

        match curve_mode {
            CurveMode::Height => self.update_height_from_curves(),
            CurveMode::Angle => self.update_angle_from_curves(),
        }
        self.rebuild();
    }

    /// Replaces the curve for one axis and recomputes depths.
    pub fn set_curve(
        &mut self,
        curve: SharedCurve,
        orientation: CurveOrientation,
        curve_mode: CurveMode,
    ) {
        match orientation {
            CurveOrientation::Horizontal => self.horizontal_curve = Some(curve),
            CurveOrientation::Vertical => self.vertical_curve = Some(curve),
        }
        self.curve_mode = curve_mode;
        self.update_depth_with_curve(curve_mode);
    }

    fn update_height_from_curves(&mut self) {
        let rel = self.relative_grid_position;
        let mut sum = 0.0;
        let mut enabled = 0;

        if let Some(curve) = &self.horizontal_curve {
            sum += curve.evaluate(rel.x);
            enabled += 1;
        }
        if let Some(curve) = &self.vertical_curve {
            sum += curve.evaluate(rel.y);
            enabled += 1;
        }

        let value = if enabled > 0 { sum / enabled as f32 } else { 0.0 };
        let depth = self.initial_depth + value * self.initial_depth;
        self.corner_depths = [depth; 4];
    }

    fn update_angle_from_curves(&mut self) {
        let rel = self.relative_grid_position;
        let mut sum = 0.0;
        let mut enabled = 0;

        if let Some(curve) = &self.diagonal_curve {
            sum += curve.evaluate((rel.x + rel.y) / 2.0);
            enabled += 1;
        }
        if let Some(curve) = &self.horizontal_curve {
            sum += curve.evaluate(rel.x);
            enabled += 1;
        }
        if let Some(curve) = &self.vertical_curve {
            sum += curve.evaluate(rel.y);
            enabled += 1;
        }

        let mut angle_deg = if enabled > 0 { sum / enabled as f32 } else { 0.0 };
        if self.snap_angle > 0 {
            let snap = self.snap_angle as f32;
            angle_deg = (angle_deg / snap).round() * snap;
        }
        self.angle = angle_deg.round() as i32;

        // Start from a flat back face at the baseline depth.
        self.corner_depths = [self.initial_depth; 4];
        self.refresh_back_points();

        // Tilt the right back edge (4 -> 5) about local +X, then find where
        // the tilted edge meets the line through the front and back
        // top-right corners. That overshoot past point 5 is the extra depth
        // the far corners (2, 3) pick up.
        let tilted = Quat::from_rotation_x(angle_deg.to_radians()) * (self.points[5] - self.points[4]);
        let edge_dir = self.points[5] - self.points[1];

        match line_line_intersection(self.points[4], tilted, self.points[1], edge_dir) {
            Some(intersection) => {
                let extra = self.points[5].distance(intersection);
                self.corner_depths[2] = self.initial_depth + extra;
                self.corner_depths[3] = self.initial_depth + extra;
            }
            None => {
                // Parallel (a ±90° tilt) or degenerate; keep the face flat.
                warn!("angle tilt {angle_deg}° has no edge intersection, keeping flat back face");
            }
        }
    }

    // ========================================================================
    // MANUAL EDITING
    // ========================================================================

    /// Sets one corner depth directly. `corner` indexes the back corners,
    /// `0..4`.
    ///
    /// Only allowed in [`EditingMode::Custom`]; the raycast and curve paths
    /// own the other two modes.
    pub fn set_corner_depth(&mut self, corner: usize, depth: f32) -> Result<(), Error> {
        if self.editing_mode != EditingMode::Custom {
            return Err(Error::CustomModeRequired);
        }
        if corner >= 4 {
            return Err(Error::CornerOutOfRange(corner));
        }
        self.corner_depths[corner] = depth;
        self.rebuild();
        Ok(())
    }

    // ========================================================================
    // MESH REBUILD
    // ========================================================================

    /// Recomputes the back points from the corner depths and replaces the
    /// render mesh and collision proxy with the fixed cuboid topology.
    pub fn rebuild(&mut self) {
        self.refresh_back_points();

        let mut vertices = Vec::with_capacity(24);
        for face in FACE_POINTS {
            for point_index in face {
                vertices.push(self.points[point_index]);
            }
        }

        self.mesh.replace(&vertices, &TRIANGLES);
        self.collider.replace(&vertices, &TRIANGLES);

        if self.indicators_visible {
            self.refresh_indicators();
        }
    }

    fn refresh_back_points(&mut self) {
        for i in 0..4 {
            let front = FRONT_POINTS[i];
            self.points[4 + i] = Vec3::new(front.x, front.y, -self.corner_depths[i]);
        }
    }

    // ========================================================================
    // INDICATORS
    // ========================================================================

    /// Creates one marker per corner point, labeled 0-7, at world-space
    /// positions. Markers track rebuilds while visible.
    pub fn show_indicators(&mut self) {
        self.indicators_visible = true;
        self.refresh_indicators();
    }

    /// Removes all corner markers.
    pub fn hide_indicators(&mut self) {
        self.indicators_visible = false;
        self.indicators.clear();
    }

    /// Currently visible corner markers.
    pub fn indicators(&self) -> &[VertexIndicator] {
        &self.indicators
    }

    fn refresh_indicators(&mut self) {
        let to_world = self.local_to_world();
        self.indicators = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| VertexIndicator::new(i, to_world.transform_point3(*p)))
            .collect();
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// World position of the block's front-face center.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the block without touching its local geometry.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        if self.indicators_visible {
            self.refresh_indicators();
        }
    }

    /// Bounding-box scale (width, height, depth).
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Current per-corner back-face depths.
    pub fn corner_depths(&self) -> [f32; 4] {
        self.corner_depths
    }

    /// The 8 corner points in local space.
    pub fn points(&self) -> &[Vec3; 8] {
        &self.points
    }

    /// Normalized position within the owning grid.
    pub fn relative_grid_position(&self) -> Vec2 {
        self.relative_grid_position
    }

    /// Grid-space (world xy) position the grid placed this block at.
    pub fn grid_position(&self) -> Vec2 {
        self.grid_position
    }

    /// Depth requested at creation time; baseline for curve calculations.
    pub fn initial_depth(&self) -> f32 {
        self.initial_depth
    }

    /// Snapped tilt in whole degrees from the last angle-mode update.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    /// Current height mode.
    pub fn height_mode(&self) -> HeightMode {
        self.height_mode
    }

    /// Selects how cutting probes map to corners.
    pub fn set_height_mode(&mut self, mode: HeightMode) {
        self.height_mode = mode;
    }

    /// Current editing mode.
    pub fn editing_mode(&self) -> EditingMode {
        self.editing_mode
    }

    /// Selects which update path may mutate depths.
    pub fn set_editing_mode(&mut self, mode: EditingMode) {
        self.editing_mode = mode;
    }

    /// The render mesh.
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// The collision proxy (always in sync with the render mesh).
    pub fn collider(&self) -> &CollisionMesh {
        &self.collider
    }
}

impl std::fmt::Debug for DiffuserBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffuserBlock")
            .field("position", &self.position)
            .field("scale", &self.scale)
            .field("corner_depths", &self.corner_depths)
            .field("height_mode", &self.height_mode)
            .field("editing_mode", &self.editing_mode)
            .field("relative_grid_position", &self.relative_grid_position)
            .field("angle", &self.angle)
            .finish_non_exhaustive()
    }
}
