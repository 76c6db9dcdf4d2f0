//! Grid configuration.
//!
//! Everything the host hands over at generation time: grid dimensions,
//! spacing, per-block size, the selected curve mode and the three optional
//! shared curves. Serde-able so the CLI can load it straight from JSON.

use serde::{Deserialize, Serialize};

use crate::block::HeightMode;
use crate::curve::{CurveMode, KeyframeCurve};
use crate::error::Error;

/// Configuration consumed by [`DiffuserGrid::generate`](super::DiffuserGrid).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of block rows
    pub rows: usize,
    /// Number of block columns
    pub columns: usize,
    /// Gap between neighboring columns
    pub horizontal_spacing: f32,
    /// Gap between neighboring rows
    pub vertical_spacing: f32,
    /// Width of each block
    pub block_width: f32,
    /// Height of each block
    pub block_height: f32,
    /// Depth of each block (also the curve baseline depth)
    pub block_depth: f32,
    /// How raycast cutting distributes depths over corners
    pub height_mode: HeightMode,
    /// How curve samples turn into geometry
    pub curve_mode: CurveMode,
    /// Tilt snapping increment in degrees for angle mode (0 disables)
    pub snap_angle: i32,
    /// Enables the row-direction curve
    pub use_horizontal_curve: bool,
    /// Enables the column-direction curve
    pub use_vertical_curve: bool,
    /// Enables the diagonal curve (angle mode only)
    pub use_diagonal_curve: bool,
    /// Curve sampled along rows
    pub horizontal_curve: Option<KeyframeCurve>,
    /// Curve sampled along columns
    pub vertical_curve: Option<KeyframeCurve>,
    /// Curve sampled along the diagonal
    pub diagonal_curve: Option<KeyframeCurve>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 4,
            horizontal_spacing: 0.0,
            vertical_spacing: 0.0,
            block_width: 1.0,
            block_height: 1.0,
            block_depth: 1.0,
            height_mode: HeightMode::Middle,
            curve_mode: CurveMode::Height,
            snap_angle: 5,
            use_horizontal_curve: false,
            use_vertical_curve: false,
            use_diagonal_curve: false,
            horizontal_curve: None,
            vertical_curve: None,
            diagonal_curve: None,
        }
    }
}

impl GridConfig {
    /// Checks the configuration before any block is created.
    pub fn validate(&self) -> Result<(), Error> {
        if self.rows == 0 || self.columns == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid needs at least one row and one column, got {}x{}",
                self.rows, self.columns
            )));
        }
        if self.block_width <= 0.0 || self.block_height <= 0.0 || self.block_depth <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "block dimensions must be positive, got {}x{}x{}",
                self.block_width, self.block_height, self.block_depth
            )));
        }
        if self.use_horizontal_curve && self.horizontal_curve.is_none() {
            return Err(Error::InvalidConfig(
                "horizontal curve enabled but not provided".into(),
            ));
        }
        if self.use_vertical_curve && self.vertical_curve.is_none() {
            return Err(Error::InvalidConfig(
                "vertical curve enabled but not provided".into(),
            ));
        }
        if self.use_diagonal_curve && self.diagonal_curve.is_none() {
            return Err(Error::InvalidConfig(
                "diagonal curve enabled but not provided".into(),
            ));
        }
        Ok(())
    }
}
