//! Grid Pipeline Tests - Generation, Cutting, Curves, Export
//!
//! End-to-end tests running the full diffuser pipeline through the public
//! API: configure, generate, deform (raycast or curves), combine, export.

use std::sync::Arc;

use glam::{Affine3A, Vec3};

use diffuser_engine::curve::{CurveMode, CurveOrientation, KeyframeCurve};
use diffuser_engine::grid::{DiffuserGrid, GridConfig};
use diffuser_engine::mesh::{MeshData, write_obj};
use diffuser_engine::surface::{ALL_LAYERS, CuttingSurface, SurfaceSet};
use diffuser_engine::{DEFAULT_DEPTH, HeightMode};

/// A large quad facing +Z at the given world z, on the given layer.
fn wall(z: f32, layer: u32) -> CuttingSurface {
    let mut mesh = MeshData::new();
    mesh.replace(
        &[
            Vec3::new(-50.0, -50.0, 0.0),
            Vec3::new(50.0, -50.0, 0.0),
            Vec3::new(50.0, 50.0, 0.0),
            Vec3::new(-50.0, 50.0, 0.0),
        ],
        &[0, 1, 2, 0, 2, 3],
    );
    CuttingSurface::new(
        &mesh,
        Affine3A::from_translation(Vec3::new(0.0, 0.0, z)),
        layer,
    )
}

// ============================================================================
// Cutting pipeline
// ============================================================================

#[test]
fn test_cut_grid_against_sloped_surface() {
    let config = GridConfig {
        rows: 3,
        columns: 3,
        block_depth: 2.0,
        height_mode: HeightMode::Middle,
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();

    // A surface sloped across x: blocks further right get cut deeper.
    let mut mesh = MeshData::new();
    mesh.replace(
        &[
            Vec3::new(-50.0, -50.0, -0.2),
            Vec3::new(50.0, -50.0, -1.5),
            Vec3::new(50.0, 50.0, -1.5),
            Vec3::new(-50.0, 50.0, -0.2),
        ],
        &[0, 1, 2, 0, 2, 3],
    );
    let mut surfaces = SurfaceSet::new();
    surfaces.add(CuttingSurface::new(&mesh, Affine3A::IDENTITY, 1));

    grid.cut_all(&surfaces, ALL_LAYERS);

    let left = grid.block(1, 0).unwrap().corner_depths()[0];
    let right = grid.block(1, 2).unwrap().corner_depths()[0];
    assert!(right > left, "sloped surface should cut right side deeper");
    // Every block in a column sees the same surface depth.
    let top = grid.block(2, 1).unwrap().corner_depths()[0];
    let bottom = grid.block(0, 1).unwrap().corner_depths()[0];
    assert!((top - bottom).abs() < 1e-4);
}

#[test]
fn test_layer_mask_selects_cutting_surface() {
    let config = GridConfig {
        rows: 1,
        columns: 1,
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();

    let mut surfaces = SurfaceSet::new();
    surfaces.add(wall(-0.25, 0b01));
    surfaces.add(wall(-0.75, 0b10));

    // Cut against layer 2 only: the nearer layer-1 wall is invisible.
    grid.cut_all(&surfaces, 0b10);
    let depth = grid.block(0, 0).unwrap().corner_depths()[0];
    assert!((depth - 0.75).abs() < 1e-4);
}

#[test]
fn test_miss_resets_previous_cut() {
    let config = GridConfig {
        rows: 2,
        columns: 2,
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();

    let mut surfaces = SurfaceSet::new();
    surfaces.add(wall(-0.4, 1));
    grid.cut_all(&surfaces, ALL_LAYERS);
    assert!((grid.block(0, 0).unwrap().corner_depths()[0] - 0.4).abs() < 1e-4);

    // Cut again with nothing to hit: depths fall back to the default.
    grid.cut_all(&SurfaceSet::new(), ALL_LAYERS);
    for block in grid.blocks() {
        assert_eq!(block.corner_depths(), [DEFAULT_DEPTH; 4]);
    }
}

// ============================================================================
// Curve pipeline
// ============================================================================

#[test]
fn test_height_curves_shape_panel() {
    let config = GridConfig {
        rows: 2,
        columns: 5,
        block_depth: 2.0,
        use_horizontal_curve: true,
        horizontal_curve: Some(KeyframeCurve::ease_in_out(0.0, 1.0)),
        use_vertical_curve: true,
        vertical_curve: Some(KeyframeCurve::constant(0.0)),
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();
    grid.update_all_with_curves();

    // Depth rises monotonically left to right along a row.
    let depths: Vec<f32> = (0..5)
        .map(|col| grid.block(0, col).unwrap().corner_depths()[0])
        .collect();
    for pair in depths.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-5, "depths should not decrease: {depths:?}");
    }
    // Both curves enabled: the vertical constant 0 halves the modifier.
    // Rightmost block: value = (1.0 + 0.0) / 2 = 0.5, depth = 2 + 0.5*2 = 3.
    assert!((depths[4] - 3.0).abs() < 0.05);
}

#[test]
fn test_row_curve_edit_propagates_through_sequence() {
    let config = GridConfig {
        rows: 3,
        columns: 4,
        block_depth: 1.0,
        use_horizontal_curve: true,
        horizontal_curve: Some(KeyframeCurve::constant(0.0)),
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();
    grid.update_all_with_curves();

    grid.set_sequence_curve(
        CurveOrientation::Horizontal,
        2,
        Arc::new(KeyframeCurve::constant(1.0)),
    )
    .unwrap();

    // Row 2 doubled its depth; rows 0 and 1 kept the baseline.
    for block in grid.row_blocks(2) {
        assert!((block.corner_depths()[0] - 2.0).abs() < 1e-4);
    }
    for block in grid.row_blocks(0).chain(grid.row_blocks(1)) {
        assert!((block.corner_depths()[0] - 1.0).abs() < 1e-4);
    }
}

#[test]
fn test_angle_mode_builds_wedges() {
    let config = GridConfig {
        rows: 1,
        columns: 3,
        block_depth: 1.0,
        curve_mode: CurveMode::Angle,
        snap_angle: 5,
        use_horizontal_curve: true,
        horizontal_curve: Some(KeyframeCurve::linear(0.0, 60.0)),
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();
    grid.update_all_with_curves();

    // Angles snap to 5-degree steps and grow along the row.
    let angles: Vec<i32> = grid.blocks().iter().map(|b| b.angle()).collect();
    for angle in &angles {
        assert_eq!(angle % 5, 0, "angle {angle} not snapped");
    }
    assert!(angles[2] > angles[0]);

    // Wedge: far corners deeper than near corners on tilted blocks.
    let tilted = grid.block(0, 2).unwrap();
    let depths = tilted.corner_depths();
    assert!(depths[2] > depths[0]);
    assert!((depths[2] - depths[3]).abs() < 1e-5);
    assert!((depths[0] - depths[1]).abs() < 1e-5);

    let histogram = grid.angle_histogram();
    let total: usize = histogram.values().sum();
    assert_eq!(total, 3);
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_combined_panel_exports_as_obj() {
    let config = GridConfig {
        rows: 2,
        columns: 2,
        use_horizontal_curve: true,
        horizontal_curve: Some(KeyframeCurve::linear(0.0, 0.5)),
        ..GridConfig::default()
    };
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();
    grid.update_all_with_curves();

    let panel = grid.combined_mesh();
    assert_eq!(panel.vertices.len(), 4 * 24);

    let mut out = Vec::new();
    write_obj(&panel, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 4 * 24);
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 4 * 12);
}

#[test]
fn test_config_json_to_panel() {
    // The CLI path: config arrives as JSON.
    let json = r#"{
        "rows": 2,
        "columns": 3,
        "block_depth": 2.0,
        "use_horizontal_curve": true,
        "horizontal_curve": { "keys": [
            { "time": 0.0, "value": 0.0 },
            { "time": 1.0, "value": 0.5 }
        ]}
    }"#;
    let config: GridConfig = serde_json::from_str(json).unwrap();
    let mut grid = DiffuserGrid::new(config).unwrap();
    grid.generate();
    grid.update_all_with_curves();

    assert_eq!(grid.blocks().len(), 6);
    // Depths follow the JSON curve: right side deeper than left.
    let left = grid.block(0, 0).unwrap().corner_depths()[0];
    let right = grid.block(0, 2).unwrap().corner_depths()[0];
    assert!(right > left);
}
