#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-ortho-check
//!
//! mesh-ortho-check evaluates the face non-orthogonality of finite-volume
//! meshes. For every internal face it compares the vector joining the two
//! adjacent cell centres with the face area vector, bins the resulting angle
//! into a histogram, flags severely non-orthogonal and erroneous faces, and
//! reduces the result across mesh partitions before reporting.
//!
//! ## Features
//! - A read-only [`MeshView`](topology::MeshView) trait, so any mesh storage can be checked
//! - Geometry derivation (face area vectors, cell centres) from polyhedral meshes
//! - Pluggable communication backends (serial, threads, MPI) for the global reduction
//! - Optional Rayon data parallelism for the per-face pass
//! - A snapshot driver for meshes that move or change topology over time
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-ortho-check = "0.3"
//! # Optional features:
//! # features = ["rayon", "mpi-support"]
//! ```
//!
//! ```
//! use mesh_ortho_check::prelude::*;
//!
//! let view = hex_block([4, 4, 4], [1.0, 1.0, 1.0])?.to_view()?;
//! let checker = OrthogonalityChecker::default();
//! let report = checker.evaluate(&view, &NoComm, None)?;
//! assert_eq!(report.n_faces, 144);
//! assert!(!report.has_errors());
//! # Ok::<(), MeshCheckError>(())
//! ```
//!
//! ## Determinism
//!
//! The thread-backed [`LocalComm`](algs::LocalComm) combines contributions in
//! rank order, so every rank receives bit-identical aggregates.

pub mod algs;
pub mod check;
pub mod debug_invariants;
pub mod driver;
pub mod geometry;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, LocalComm, NoComm, ReduceOp};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::decompose::{Partition, decompose_by_owner, decompose_faces};
    pub use crate::algs::meshgen::hex_block;
    pub use crate::check::{OrthogonalityChecker, OrthogonalityConfig, OrthogonalityReport};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::driver::{CheckDriver, SnapshotOutcome, UpdateState};
    pub use crate::geometry::metrics::PolyMesh;
    pub use crate::mesh_error::MeshCheckError;
    pub use crate::topology::face_set::FaceSet;
    pub use crate::topology::ids::{CellId, FaceId};
    pub use crate::topology::mesh_view::{MeshView, PolyMeshView};
}
