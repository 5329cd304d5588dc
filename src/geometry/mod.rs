//! Geometry for mesh-ortho-check.
//!
//! This module provides small vector helpers, derivation of face and cell
//! geometry from polyhedral meshes, and the per-face non-orthogonality metric.

pub mod metrics;
pub mod orthogonality;
pub mod vector;

pub use metrics::PolyMesh;
pub use vector::Vector;
