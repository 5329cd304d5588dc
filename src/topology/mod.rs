//! Top-level module for mesh topology abstractions.
//!
//! It includes:
//! - dense face and cell identifiers
//! - the read-only [`MeshView`] accessor trait and its array-backed implementation
//! - [`FaceSet`] for collecting offending faces

pub mod face_set;
pub mod ids;
pub mod mesh_view;

pub use face_set::FaceSet;
pub use ids::{CellId, FaceId};
pub use mesh_view::{MeshView, PolyMeshView, validate_mesh_view};
