//! Depth/angle curves.
//!
//! Blocks never own their curves: a grid (or a row/column sequence) hands the
//! same [`SharedCurve`] to every member block, and blocks only read it while
//! recomputing depths. [`KeyframeCurve`] is the concrete serde-able
//! implementation used by configs; anything implementing [`Curve`] works.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Which grid axis a curve (or a block sequence) runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveOrientation {
    /// Runs along a row (sampled at the normalized x coordinate)
    Horizontal,
    /// Runs along a column (sampled at the normalized y coordinate)
    Vertical,
}

/// How curve samples turn into block geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveMode {
    /// Curve output is a fractional modifier of the baseline depth,
    /// applied uniformly to all four back corners
    Height,
    /// Curve output is a tilt angle in degrees; the back face becomes a
    /// wedge by deepening the far pair of corners
    Angle,
}

/// An evaluable scalar curve over a normalized coordinate.
///
/// `t` is typically in `[0, 1]` but the contract does not clamp it; concrete
/// implementations decide what happens outside the sampled range.
pub trait Curve {
    /// Samples the curve at `t`.
    fn evaluate(&self, t: f32) -> f32;
}

/// A curve shared read-only between many blocks.
pub type SharedCurve = Arc<dyn Curve + Send + Sync>;

/// A single control point of a [`KeyframeCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Sample coordinate this key sits at
    pub time: f32,
    /// Curve value at `time`
    pub value: f32,
    /// Incoming slope (value units per time unit)
    #[serde(default)]
    pub in_tangent: f32,
    /// Outgoing slope (value units per time unit)
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    /// Creates a keyframe with explicit tangents.
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }

    /// Creates a keyframe with flat (zero) tangents.
    pub fn flat(time: f32, value: f32) -> Self {
        Self::new(time, value, 0.0, 0.0)
    }
}

/// Piecewise cubic Hermite curve over sorted keyframes.
///
/// Between two neighboring keys the value is Hermite-interpolated using the
/// left key's `out_tangent` and the right key's `in_tangent`. Outside the
/// keyed range evaluation clamps to the first/last key's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    /// Creates a curve from keyframes, sorting them by time.
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Straight line from `v0` at t=0 to `v1` at t=1.
    pub fn linear(v0: f32, v1: f32) -> Self {
        let slope = v1 - v0;
        Self::new(vec![
            Keyframe::new(0.0, v0, slope, slope),
            Keyframe::new(1.0, v1, slope, slope),
        ])
    }

    /// Constant value everywhere.
    pub fn constant(v: f32) -> Self {
        Self::new(vec![Keyframe::flat(0.0, v)])
    }

    /// Smooth ease from `v0` at t=0 to `v1` at t=1 (flat tangents at both
    /// ends, the familiar smoothstep shape).
    pub fn ease_in_out(v0: f32, v1: f32) -> Self {
        Self::new(vec![Keyframe::flat(0.0, v0), Keyframe::flat(1.0, v1)])
    }

    /// The sorted keyframes.
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }
}

impl Curve for KeyframeCurve {
    fn evaluate(&self, t: f32) -> f32 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        let last = self.keys.last().unwrap();

        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // Find the segment containing t; keys are sorted.
        let right_index = self
            .keys
            .iter()
            .position(|k| k.time > t)
            .unwrap_or(self.keys.len() - 1);
        let left = &self.keys[right_index - 1];
        let right = &self.keys[right_index];

        let dt = right.time - left.time;
        if dt <= f32::EPSILON {
            return left.value;
        }

        // Cubic Hermite basis; tangents are slopes, so scale by dt.
        let s = (t - left.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * left.value
            + h10 * dt * left.out_tangent
            + h01 * right.value
            + h11 * dt * right.in_tangent
    }
}
