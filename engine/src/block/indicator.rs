//! Per-corner vertex indicators.
//!
//! Overlay markers the host's selection UI places over the 8 corner points
//! of a block, labeled by point index. The core only computes them; drawing
//! is the host's job.

use glam::Vec3;

/// A marker over one corner point of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexIndicator {
    /// Which of the 8 corner points this marker tracks (0-7)
    pub index: usize,
    /// World-space position of the tracked point
    pub position: Vec3,
    /// Display label, the point index as text
    pub label: String,
}

impl VertexIndicator {
    /// Creates a marker for point `index` at `position`.
    pub fn new(index: usize, position: Vec3) -> Self {
        Self {
            index,
            position,
            label: index.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_matches_index() {
        let marker = VertexIndicator::new(6, Vec3::ZERO);
        assert_eq!(marker.label, "6");
        assert_eq!(marker.index, 6);
    }
}
