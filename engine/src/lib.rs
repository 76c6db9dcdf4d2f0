//! Diffuser Engine Library
//!
//! Procedural generation of acoustic diffuser panels: a grid of parametric
//! cuboid blocks whose back faces are shaped either by raycasting against
//! cutting surfaces or by sampling shared curves across the grid.
//!
//! # Modules
//!
//! - [`geometry`] - Line-line and ray-triangle intersection math
//! - [`mesh`] - Mesh buffers, normals, combining, OBJ export, collision proxy
//! - [`curve`] - The `Curve` contract and the keyframe implementation
//! - [`surface`] - Cutting surfaces and the layer-masked raycast oracle
//! - [`block`] - The block shape engine (the deformable cuboid)
//! - [`grid`] - Grid layout, row/column sequences, batch operations
//!
//! # Example
//!
//! ```
//! use diffuser_engine::curve::KeyframeCurve;
//! use diffuser_engine::grid::{DiffuserGrid, GridConfig};
//!
//! let config = GridConfig {
//!     rows: 4,
//!     columns: 8,
//!     block_depth: 2.0,
//!     use_horizontal_curve: true,
//!     horizontal_curve: Some(KeyframeCurve::ease_in_out(0.0, 0.5)),
//!     ..GridConfig::default()
//! };
//!
//! let mut grid = DiffuserGrid::new(config).unwrap();
//! grid.generate();
//! grid.update_all_with_curves();
//!
//! let panel = grid.combined_mesh();
//! assert_eq!(panel.vertices.len(), 4 * 8 * 24);
//! ```

pub mod block;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod mesh;
pub mod surface;

pub use block::{DEFAULT_DEPTH, DiffuserBlock, EditingMode, HeightMode, VertexIndicator};
pub use curve::{Curve, CurveMode, CurveOrientation, Keyframe, KeyframeCurve, SharedCurve};
pub use error::Error;
pub use grid::{BlockSequence, DiffuserGrid, GridConfig};
pub use mesh::{CollisionMesh, MeshData, write_obj};
pub use surface::{ALL_LAYERS, CuttingSurface, SurfaceSet};
