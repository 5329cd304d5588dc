//! MeshCheckError: Unified error type for mesh-ortho-check public APIs
//!
//! The orthogonality evaluation itself never fails on geometry; degenerate
//! faces are classified, not rejected. Errors here come from validating
//! constructors, configuration, collective communication and the report sink.

use crate::algs::communicator::CommError;
use crate::topology::ids::{CellId, FaceId};
use thiserror::Error;

/// Unified error type for mesh-ortho-check operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshCheckError {
    /// A configuration value is out of its admissible range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Two arrays that must be indexed in lockstep have different lengths.
    #[error("Length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A face refers to a cell outside the cell-centre array.
    #[error("Face {face} refers to cell {cell}, but the mesh has {n_cells} cells")]
    CellOutOfRange {
        face: FaceId,
        cell: CellId,
        n_cells: usize,
    },
    /// A face refers to a point outside the point array.
    #[error("Face {face} refers to point {point}, but the mesh has {n_points} points")]
    PointOutOfRange {
        face: FaceId,
        point: usize,
        n_points: usize,
    },
    /// An internal face has the same cell on both sides.
    #[error("Internal face {face} has identical owner and neighbour cell {cell}")]
    SelfNeighbour { face: FaceId, cell: CellId },
    /// A face has fewer than three vertices.
    #[error("Face {face} has {n_points} points, at least 3 are required")]
    DegenerateFace { face: FaceId, n_points: usize },
    /// A face or cell was assigned to a partition that does not exist.
    #[error("Entity {index} assigned to partition {part}, but only {n_parts} partitions exist")]
    PartitionOutOfRange {
        index: usize,
        part: usize,
        n_parts: usize,
    },
    /// Collective communication failed.
    #[error("Communication error: {0}")]
    Comm(#[from] CommError),
    /// Writing the textual report failed.
    #[error("Report output failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for MeshCheckError {
    fn from(e: std::io::Error) -> Self {
        MeshCheckError::Io(e.to_string())
    }
}
