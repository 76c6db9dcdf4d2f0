//! Row/column block sequences.
//!
//! A sequence is a non-owning view over the blocks sharing one grid axis,
//! tagged with its orientation and curve mode and holding the curve
//! currently assigned to that row or column. The grid resolves the indices
//! back into blocks when a curve edit has to propagate.

use crate::curve::{CurveMode, CurveOrientation, SharedCurve};

/// A row or column of blocks sharing one curve assignment.
#[derive(Clone)]
pub struct BlockSequence {
    /// Indices into the grid's block vector, in axis order
    indices: Vec<usize>,
    orientation: CurveOrientation,
    curve: Option<SharedCurve>,
    curve_mode: CurveMode,
}

impl BlockSequence {
    /// Creates a sequence over the given block indices.
    pub fn new(
        indices: Vec<usize>,
        orientation: CurveOrientation,
        curve: Option<SharedCurve>,
        curve_mode: CurveMode,
    ) -> Self {
        Self {
            indices,
            orientation,
            curve,
            curve_mode,
        }
    }

    /// Member block indices in axis order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Which grid axis this sequence runs along.
    pub fn orientation(&self) -> CurveOrientation {
        self.orientation
    }

    /// The curve currently assigned to this sequence.
    pub fn curve(&self) -> Option<&SharedCurve> {
        self.curve.as_ref()
    }

    /// How curve edits on this sequence are interpreted.
    pub fn curve_mode(&self) -> CurveMode {
        self.curve_mode
    }

    /// Stores a new curve assignment. The grid pushes it to member blocks.
    pub(super) fn assign_curve(&mut self, curve: SharedCurve) {
        self.curve = Some(curve);
    }
}

impl std::fmt::Debug for BlockSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockSequence")
            .field("indices", &self.indices)
            .field("orientation", &self.orientation)
            .field("curve_mode", &self.curve_mode)
            .field("has_curve", &self.curve.is_some())
            .finish()
    }
}
