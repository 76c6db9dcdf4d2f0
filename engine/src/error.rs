//! Crate-wide error type.
//!
//! Mode enums are closed, so "unknown mode" is unrepresentable; what remains
//! are configuration mistakes caught up front, gated operations invoked in
//! the wrong editing mode, and I/O when loading configs or writing meshes.

use crate::curve::CurveOrientation;

/// Errors produced by the diffuser engine.
#[derive(Debug)]
pub enum Error {
    /// Grid configuration failed validation (zero rows, missing curve, ...).
    InvalidConfig(String),
    /// Manual corner editing was attempted outside `EditingMode::Custom`.
    CustomModeRequired,
    /// A corner index outside `0..4` was passed to a per-corner edit.
    CornerOutOfRange(usize),
    /// A row/column sequence index was outside the generated grid.
    SequenceOutOfRange {
        /// Which axis was addressed.
        orientation: CurveOrientation,
        /// The offending index.
        index: usize,
    },
    /// Standard I/O error.
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid grid configuration: {msg}"),
            Error::CustomModeRequired => {
                write!(f, "corner depths can only be edited in Custom mode")
            }
            Error::CornerOutOfRange(corner) => {
                write!(f, "corner index {corner} out of range (blocks have 4 corners)")
            }
            Error::SequenceOutOfRange { orientation, index } => {
                write!(f, "{orientation:?} sequence index {index} out of range")
            }
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
