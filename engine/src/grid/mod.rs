//! Grid layout and sequencing.
//!
//! The grid owns the `rows x columns` matrix of blocks, computes centered
//! placement, and groups blocks into row/column sequences so a curve edit on
//! one sequence propagates to every member block. Regeneration is always a
//! full rebuild: the previous blocks and sequences are dropped wholesale, so
//! stale references cannot survive a `generate()`.

mod config;
mod sequence;

pub use config::GridConfig;
pub use sequence::BlockSequence;

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Vec2, Vec3};
use log::debug;

use crate::block::{DiffuserBlock, EditingMode};
use crate::curve::{CurveOrientation, SharedCurve};
use crate::error::Error;
use crate::mesh::{self, MeshData};
use crate::surface::SurfaceSet;

/// A grid of diffuser blocks with shared curves and row/column sequences.
pub struct DiffuserGrid {
    config: GridConfig,
    blocks: Vec<DiffuserBlock>,
    row_sequences: Vec<BlockSequence>,
    column_sequences: Vec<BlockSequence>,
    horizontal_curve: Option<SharedCurve>,
    vertical_curve: Option<SharedCurve>,
    diagonal_curve: Option<SharedCurve>,
}

impl DiffuserGrid {
    /// Creates an empty grid from a validated configuration.
    ///
    /// No blocks exist until [`generate`](Self::generate) is called.
    pub fn new(config: GridConfig) -> Result<Self, Error> {
        config.validate()?;

        let horizontal_curve = enabled_curve(config.use_horizontal_curve, &config.horizontal_curve);
        let vertical_curve = enabled_curve(config.use_vertical_curve, &config.vertical_curve);
        let diagonal_curve = enabled_curve(config.use_diagonal_curve, &config.diagonal_curve);

        Ok(Self {
            config,
            blocks: Vec::new(),
            row_sequences: Vec::new(),
            column_sequences: Vec::new(),
            horizontal_curve,
            vertical_curve,
            diagonal_curve,
        })
    }

    /// Replaces the configuration; takes effect on the next `generate()`.
    pub fn set_config(&mut self, config: GridConfig) -> Result<(), Error> {
        config.validate()?;
        self.horizontal_curve = enabled_curve(config.use_horizontal_curve, &config.horizontal_curve);
        self.vertical_curve = enabled_curve(config.use_vertical_curve, &config.vertical_curve);
        self.diagonal_curve = enabled_curve(config.use_diagonal_curve, &config.diagonal_curve);
        self.config = config;
        Ok(())
    }

    /// Total width of the laid-out grid.
    pub fn width(&self) -> f32 {
        let c = &self.config;
        c.columns as f32 * c.block_width + (c.columns - 1) as f32 * c.horizontal_spacing
    }

    /// Total height of the laid-out grid.
    pub fn height(&self) -> f32 {
        let c = &self.config;
        c.rows as f32 * c.block_height + (c.rows - 1) as f32 * c.vertical_spacing
    }

    // ========================================================================
    // GENERATION
    // ========================================================================

    /// Rebuilds the whole grid from the current configuration.
    ///
    /// Previously generated blocks and sequences are destroyed first; there
    /// is no incremental update path. Block centers are laid out so the
    /// grid is centered on the origin.
    pub fn generate(&mut self) {
        self.blocks.clear();
        self.row_sequences.clear();
        self.column_sequences.clear();

        let c = &self.config;
        let total_width = self.width();
        let total_height = self.height();
        let column_start = -total_width / 2.0;
        let row_start = -total_height / 2.0;

        // Blocks driven by curves start in Curve mode, otherwise Cutting.
        let editing_mode = if self.horizontal_curve.is_some()
            || self.vertical_curve.is_some()
            || self.diagonal_curve.is_some()
        {
            EditingMode::Curve
        } else {
            EditingMode::Cutting
        };

        debug!(
            "generating {}x{} grid, {:.2} x {:.2} world units",
            c.rows, c.columns, total_width, total_height
        );

        for row in 0..c.rows {
            let y = row as f32 * c.block_height
                + c.block_height / 2.0
                + row as f32 * c.vertical_spacing
                + row_start;

            for column in 0..c.columns {
                let x = c.block_width * column as f32
                    + c.block_width / 2.0
                    + column as f32 * c.horizontal_spacing
                    + column_start;

                let grid_position = Vec2::new(x, y);
                let relative = Vec2::new(
                    (x + total_width / 2.0) / total_width,
                    (y + total_height / 2.0) / total_height,
                );

                let mut block = DiffuserBlock::new(Vec3::new(x, y, 0.0));
                block.set_size(c.block_width, c.block_height, c.block_depth);
                block.set_height_mode(c.height_mode);
                block.set_editing_mode(editing_mode);
                block.initialize(
                    grid_position,
                    relative,
                    self.horizontal_curve.clone(),
                    self.vertical_curve.clone(),
                    self.diagonal_curve.clone(),
                    c.curve_mode,
                    c.snap_angle,
                );
                self.blocks.push(block);
            }
        }

        // Row and column sequences are index views over the same blocks.
        for row in 0..c.rows {
            let indices = (0..c.columns).map(|col| row * c.columns + col).collect();
            self.row_sequences.push(BlockSequence::new(
                indices,
                CurveOrientation::Horizontal,
                self.horizontal_curve.clone(),
                c.curve_mode,
            ));
        }
        for column in 0..c.columns {
            let indices = (0..c.rows).map(|row| row * c.columns + column).collect();
            self.column_sequences.push(BlockSequence::new(
                indices,
                CurveOrientation::Vertical,
                self.vertical_curve.clone(),
                c.curve_mode,
            ));
        }
    }

    // ========================================================================
    // BATCH OPERATIONS
    // ========================================================================

    /// Cuts every block against the given surfaces.
    pub fn cut_all(&mut self, surfaces: &SurfaceSet, layer_mask: u32) {
        for block in &mut self.blocks {
            block.cut_with_surface(surfaces, layer_mask);
        }
    }

    /// Recomputes every block's depths from the assigned curves.
    pub fn update_all_with_curves(&mut self) {
        let mode = self.config.curve_mode;
        for block in &mut self.blocks {
            block.update_depth_with_curve(mode);
        }
    }

    /// Assigns a new curve to one row (`Horizontal`) or column (`Vertical`)
    /// sequence and pushes it to every member block.
    pub fn set_sequence_curve(
        &mut self,
        orientation: CurveOrientation,
        index: usize,
        curve: SharedCurve,
    ) -> Result<(), Error> {
        let sequences = match orientation {
            CurveOrientation::Horizontal => &mut self.row_sequences,
            CurveOrientation::Vertical => &mut self.column_sequences,
        };
        let sequence = sequences
            .get_mut(index)
            .ok_or(Error::SequenceOutOfRange { orientation, index })?;

        sequence.assign_curve(curve.clone());
        let curve_mode = sequence.curve_mode();
        let indices: Vec<usize> = sequence.indices().to_vec();

        for block_index in indices {
            self.blocks[block_index].set_curve(curve.clone(), orientation, curve_mode);
        }
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// The block at `(row, column)`, if the grid has been generated.
    pub fn block(&self, row: usize, column: usize) -> Option<&DiffuserBlock> {
        if row >= self.config.rows || column >= self.config.columns {
            return None;
        }
        self.blocks.get(row * self.config.columns + column)
    }

    /// Mutable access to the block at `(row, column)`.
    pub fn block_mut(&mut self, row: usize, column: usize) -> Option<&mut DiffuserBlock> {
        if row >= self.config.rows || column >= self.config.columns {
            return None;
        }
        self.blocks.get_mut(row * self.config.columns + column)
    }

    /// All blocks in row-major order.
    pub fn blocks(&self) -> &[DiffuserBlock] {
        &self.blocks
    }

    /// The blocks of one row, left to right.
    pub fn row_blocks(&self, row: usize) -> impl Iterator<Item = &DiffuserBlock> {
        let columns = self.config.columns;
        self.blocks.iter().skip(row * columns).take(columns)
    }

    /// The blocks of one column, bottom to top. Out-of-range columns yield
    /// nothing.
    pub fn column_blocks(&self, column: usize) -> impl Iterator<Item = &DiffuserBlock> {
        let columns = self.config.columns;
        let start = if column < columns {
            column
        } else {
            self.blocks.len()
        };
        self.blocks.iter().skip(start).step_by(columns.max(1))
    }

    /// Row sequences (one per row).
    pub fn row_sequences(&self) -> &[BlockSequence] {
        &self.row_sequences
    }

    /// Column sequences (one per column).
    pub fn column_sequences(&self) -> &[BlockSequence] {
        &self.column_sequences
    }

    /// The active configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    // ========================================================================
    // TOOLS
    // ========================================================================

    /// Bakes every block through its transform into one combined mesh,
    /// ready for OBJ export.
    pub fn combined_mesh(&self) -> MeshData {
        let parts: Vec<_> = self
            .blocks
            .iter()
            .map(|b| (b.mesh(), b.local_to_world()))
            .collect();
        mesh::combine(&parts)
    }

    /// Counts blocks per snapped tilt angle (angle mode only; all zeros in
    /// height mode).
    pub fn angle_histogram(&self) -> BTreeMap<i32, usize> {
        let mut histogram = BTreeMap::new();
        for block in &self.blocks {
            *histogram.entry(block.angle()).or_insert(0) += 1;
        }
        histogram
    }

    /// Shifts every other row (0, 2, 4, ...) sideways by `dx`, giving the
    /// staggered brick-like layout.
    pub fn offset_alternate_rows(&mut self, dx: f32) {
        for row in (0..self.config.rows).step_by(2) {
            for column in 0..self.config.columns {
                self.blocks[row * self.config.columns + column].translate(Vec3::new(dx, 0.0, 0.0));
            }
        }
    }
}

fn enabled_curve(enabled: bool, curve: &Option<crate::curve::KeyframeCurve>) -> Option<SharedCurve> {
    if !enabled {
        return None;
    }
    curve.as_ref().map(|c| Arc::new(c.clone()) as SharedCurve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DEFAULT_DEPTH;
    use crate::curve::{CurveMode, KeyframeCurve};
    use crate::surface::{ALL_LAYERS, CuttingSurface};
    use glam::Affine3A;

    fn grid_2x3() -> DiffuserGrid {
        let config = GridConfig {
            rows: 2,
            columns: 3,
            ..GridConfig::default()
        };
        let mut grid = DiffuserGrid::new(config).unwrap();
        grid.generate();
        grid
    }

    fn height_curve_config(curve: KeyframeCurve) -> GridConfig {
        GridConfig {
            rows: 2,
            columns: 3,
            block_depth: 2.0,
            use_horizontal_curve: true,
            horizontal_curve: Some(curve),
            ..GridConfig::default()
        }
    }

    #[test]
    fn test_2x3_grid_centers() {
        let grid = grid_2x3();
        assert_eq!(grid.blocks().len(), 6);

        let expected_x = [-1.0, 0.0, 1.0];
        let expected_y = [-0.5, 0.5];
        for (row, &y) in expected_y.iter().enumerate() {
            for (column, &x) in expected_x.iter().enumerate() {
                let block = grid.block(row, column).unwrap();
                assert!(
                    block.position().distance(Vec3::new(x, y, 0.0)) < 1e-5,
                    "block ({row},{column}) at {:?}, expected ({x},{y})",
                    block.position()
                );
            }
        }
    }

    #[test]
    fn test_grid_dimensions_include_spacing() {
        let config = GridConfig {
            rows: 2,
            columns: 3,
            horizontal_spacing: 0.5,
            vertical_spacing: 0.25,
            ..GridConfig::default()
        };
        let grid = DiffuserGrid::new(config).unwrap();
        assert!((grid.width() - 4.0).abs() < 1e-5);
        assert!((grid.height() - 2.25).abs() < 1e-5);
    }

    #[test]
    fn test_relative_positions_span_unit_square() {
        let grid = grid_2x3();
        let first = grid.block(0, 0).unwrap().relative_grid_position();
        let last = grid.block(1, 2).unwrap().relative_grid_position();

        // Centers normalized over the full grid extent.
        assert!(first.x > 0.0 && first.x < 0.5);
        assert!(first.y > 0.0 && first.y < 0.5);
        assert!(last.x > 0.5 && last.x < 1.0);
        assert!(last.y > 0.5 && last.y < 1.0);
        // Symmetric about the center.
        assert!((first.x + last.x - 1.0).abs() < 1e-5);
        assert!((first.y + last.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_regeneration_replaces_all_blocks() {
        let mut grid = grid_2x3();
        assert_eq!(grid.blocks().len(), 6);

        let config = GridConfig {
            rows: 4,
            columns: 5,
            ..GridConfig::default()
        };
        grid.set_config(config).unwrap();
        grid.generate();

        assert_eq!(grid.blocks().len(), 20);
        assert_eq!(grid.row_sequences().len(), 4);
        assert_eq!(grid.column_sequences().len(), 5);
        // Every block belongs to the new layout (5 columns wide).
        let width = grid.width();
        for block in grid.blocks() {
            assert!(block.position().x.abs() <= width / 2.0);
        }
    }

    #[test]
    fn test_sequences_view_correct_blocks() {
        let grid = grid_2x3();
        assert_eq!(grid.row_sequences().len(), 2);
        assert_eq!(grid.column_sequences().len(), 3);
        assert_eq!(grid.row_sequences()[1].indices(), &[3, 4, 5]);
        assert_eq!(grid.column_sequences()[0].indices(), &[0, 3]);

        let row_y: Vec<f32> = grid.row_blocks(0).map(|b| b.position().y).collect();
        assert!(row_y.iter().all(|&y| (y + 0.5).abs() < 1e-5));
        let col_x: Vec<f32> = grid.column_blocks(2).map(|b| b.position().x).collect();
        assert!(col_x.iter().all(|&x| (x - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_out_of_range_column_yields_no_blocks() {
        let grid = grid_2x3();
        assert_eq!(grid.column_blocks(2).count(), 2);
        assert_eq!(grid.column_blocks(3).count(), 0);
        assert_eq!(grid.column_blocks(99).count(), 0);
    }

    #[test]
    fn test_curve_driven_grid_updates_depths() {
        let mut grid = DiffuserGrid::new(height_curve_config(KeyframeCurve::constant(0.5))).unwrap();
        grid.generate();
        grid.update_all_with_curves();

        for block in grid.blocks() {
            for depth in block.corner_depths() {
                // 2 + 0.5 * 2 = 3 everywhere.
                assert!((depth - 3.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_horizontal_curve_varies_across_columns() {
        let mut grid = DiffuserGrid::new(height_curve_config(KeyframeCurve::linear(0.0, 1.0))).unwrap();
        grid.generate();
        grid.update_all_with_curves();

        let left = grid.block(0, 0).unwrap().corner_depths()[0];
        let right = grid.block(0, 2).unwrap().corner_depths()[0];
        assert!(right > left, "linear curve should deepen toward +x");
        // Same column, different row: identical depth (horizontal curve only).
        assert!(
            (grid.block(0, 1).unwrap().corner_depths()[0]
                - grid.block(1, 1).unwrap().corner_depths()[0])
                .abs()
                < 1e-5
        );
    }

    #[test]
    fn test_sequence_curve_propagates_to_members_only() {
        let mut grid = DiffuserGrid::new(height_curve_config(KeyframeCurve::constant(0.0))).unwrap();
        grid.generate();
        grid.update_all_with_curves();

        grid.set_sequence_curve(
            CurveOrientation::Horizontal,
            1,
            Arc::new(KeyframeCurve::constant(0.5)),
        )
        .unwrap();

        // Row 1 picked up the new curve (depth 3), row 0 kept the old one.
        for block in grid.row_blocks(1) {
            assert!((block.corner_depths()[0] - 3.0).abs() < 1e-4);
        }
        for block in grid.row_blocks(0) {
            assert!((block.corner_depths()[0] - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sequence_index_out_of_range() {
        let mut grid = grid_2x3();
        let result = grid.set_sequence_curve(
            CurveOrientation::Vertical,
            99,
            Arc::new(KeyframeCurve::constant(0.0)),
        );
        assert!(matches!(
            result,
            Err(Error::SequenceOutOfRange { index: 99, .. })
        ));
    }

    #[test]
    fn test_cut_all_against_shared_wall() {
        let mut grid = grid_2x3();

        let mut wall = crate::mesh::MeshData::new();
        wall.replace(
            &[
                Vec3::new(-10.0, -10.0, 0.0),
                Vec3::new(10.0, -10.0, 0.0),
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(-10.0, 10.0, 0.0),
            ],
            &[0, 1, 2, 0, 2, 3],
        );
        let mut surfaces = SurfaceSet::new();
        surfaces.add(CuttingSurface::new(
            &wall,
            Affine3A::from_translation(Vec3::new(0.0, 0.0, -0.3)),
            1,
        ));

        grid.cut_all(&surfaces, ALL_LAYERS);
        for block in grid.blocks() {
            for depth in block.corner_depths() {
                assert!((depth - 0.3).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_cut_all_miss_resets_to_default() {
        let mut grid = grid_2x3();
        grid.cut_all(&SurfaceSet::new(), ALL_LAYERS);
        for block in grid.blocks() {
            assert_eq!(block.corner_depths(), [DEFAULT_DEPTH; 4]);
        }
    }

    #[test]
    fn test_combined_mesh_bakes_every_block() {
        let grid = grid_2x3();
        let combined = grid.combined_mesh();
        assert_eq!(combined.vertices.len(), 6 * 24);
        assert_eq!(combined.triangles.len(), 6 * 36);

        // Vertices land in world space: some at x < -1 (leftmost block).
        assert!(combined.vertices.iter().any(|v| v.x < -1.0));
    }

    #[test]
    fn test_angle_histogram_counts_blocks() {
        let config = GridConfig {
            rows: 2,
            columns: 2,
            curve_mode: CurveMode::Angle,
            use_horizontal_curve: true,
            horizontal_curve: Some(KeyframeCurve::constant(45.0)),
            ..GridConfig::default()
        };
        let mut grid = DiffuserGrid::new(config).unwrap();
        grid.generate();
        grid.update_all_with_curves();

        let histogram = grid.angle_histogram();
        assert_eq!(histogram.get(&45), Some(&4));
    }

    #[test]
    fn test_offset_alternate_rows() {
        let mut grid = grid_2x3();
        let row0_before: Vec<f32> = grid.row_blocks(0).map(|b| b.position().x).collect();
        let row1_before: Vec<f32> = grid.row_blocks(1).map(|b| b.position().x).collect();

        grid.offset_alternate_rows(0.5);

        for (block, before) in grid.row_blocks(0).zip(row0_before) {
            assert!((block.position().x - before - 0.5).abs() < 1e-5);
        }
        for (block, before) in grid.row_blocks(1).zip(row1_before) {
            assert!((block.position().x - before).abs() < 1e-5);
        }
    }
}
