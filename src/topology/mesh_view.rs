//! Read-only mesh access for quality checks.
//!
//! [`MeshView`] is the capability the orthogonality evaluator needs: for each
//! internal face its owner and neighbour cell and its area vector, and for each
//! cell its centre. Boundary faces are not part of a view. Any storage can
//! implement the trait; [`PolyMeshView`] is the array-backed implementation
//! produced by [`PolyMesh::to_view`](crate::geometry::metrics::PolyMesh::to_view)
//! and by [`decompose_faces`](crate::algs::decompose::decompose_faces).
//!
//! # Invariants
//! - `owner(f)` and `neighbour(f)` are `< n_cells()` for every internal face.
//! - `owner(f) != neighbour(f)`.
//!
//! Views must stay unchanged for the duration of one evaluation.

use crate::debug_invariants::DebugInvariants;
use crate::geometry::vector::Vector;
use crate::mesh_error::MeshCheckError;
use crate::topology::ids::{CellId, FaceId};

/// Read-only accessor over the internal faces and cell centres of a mesh.
pub trait MeshView {
    /// Number of internal faces (faces with both an owner and a neighbour).
    fn n_internal_faces(&self) -> usize;
    /// Number of cells addressable through `cell_centre`.
    fn n_cells(&self) -> usize;
    /// Owner cell of internal face `face`.
    fn owner(&self, face: FaceId) -> CellId;
    /// Neighbour cell of internal face `face`.
    fn neighbour(&self, face: FaceId) -> CellId;
    /// Centre of cell `cell`.
    fn cell_centre(&self, cell: CellId) -> Vector;
    /// Area vector of internal face `face`, pointing from owner to neighbour.
    fn face_area(&self, face: FaceId) -> Vector;

    /// Internal faces in order.
    fn internal_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.n_internal_faces()).map(FaceId::new)
    }
}

impl<M: MeshView + ?Sized> MeshView for &M {
    fn n_internal_faces(&self) -> usize {
        (**self).n_internal_faces()
    }
    fn n_cells(&self) -> usize {
        (**self).n_cells()
    }
    fn owner(&self, face: FaceId) -> CellId {
        (**self).owner(face)
    }
    fn neighbour(&self, face: FaceId) -> CellId {
        (**self).neighbour(face)
    }
    fn cell_centre(&self, cell: CellId) -> Vector {
        (**self).cell_centre(cell)
    }
    fn face_area(&self, face: FaceId) -> Vector {
        (**self).face_area(face)
    }
}

/// Check the index invariants of any [`MeshView`].
///
/// Returns the first violation found, scanning faces in order.
pub fn validate_mesh_view<M: MeshView + ?Sized>(mesh: &M) -> Result<(), MeshCheckError> {
    let n_cells = mesh.n_cells();
    for face in mesh.internal_faces() {
        let own = mesh.owner(face);
        let nei = mesh.neighbour(face);
        for cell in [own, nei] {
            if cell.get() >= n_cells {
                return Err(MeshCheckError::CellOutOfRange {
                    face,
                    cell,
                    n_cells,
                });
            }
        }
        if own == nei {
            return Err(MeshCheckError::SelfNeighbour { face, cell: own });
        }
    }
    Ok(())
}

/// Array-backed mesh view over internal faces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyMeshView {
    cell_centres: Vec<Vector>,
    face_areas: Vec<Vector>,
    owner: Vec<CellId>,
    neighbour: Vec<CellId>,
}

impl PolyMeshView {
    /// Build a view from per-cell centres and per-internal-face data.
    ///
    /// `face_areas`, `owner` and `neighbour` must all have one entry per
    /// internal face.
    pub fn new(
        cell_centres: Vec<Vector>,
        face_areas: Vec<Vector>,
        owner: Vec<CellId>,
        neighbour: Vec<CellId>,
    ) -> Result<Self, MeshCheckError> {
        let view = Self {
            cell_centres,
            face_areas,
            owner,
            neighbour,
        };
        view.validate_invariants()?;
        Ok(view)
    }

    /// Convenience constructor taking raw `usize` labels.
    pub fn from_labels(
        cell_centres: Vec<Vector>,
        face_areas: Vec<Vector>,
        owner: &[usize],
        neighbour: &[usize],
    ) -> Result<Self, MeshCheckError> {
        Self::new(
            cell_centres,
            face_areas,
            owner.iter().copied().map(CellId::new).collect(),
            neighbour.iter().copied().map(CellId::new).collect(),
        )
    }

    /// A view with no cells and no faces.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cell_centres(&self) -> &[Vector] {
        &self.cell_centres
    }

    #[inline]
    pub fn face_areas(&self) -> &[Vector] {
        &self.face_areas
    }

    #[inline]
    pub fn owners(&self) -> &[CellId] {
        &self.owner
    }

    #[inline]
    pub fn neighbours(&self) -> &[CellId] {
        &self.neighbour
    }
}

impl MeshView for PolyMeshView {
    #[inline]
    fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }
    #[inline]
    fn n_cells(&self) -> usize {
        self.cell_centres.len()
    }
    #[inline]
    fn owner(&self, face: FaceId) -> CellId {
        self.owner[face.get()]
    }
    #[inline]
    fn neighbour(&self, face: FaceId) -> CellId {
        self.neighbour[face.get()]
    }
    #[inline]
    fn cell_centre(&self, cell: CellId) -> Vector {
        self.cell_centres[cell.get()]
    }
    #[inline]
    fn face_area(&self, face: FaceId) -> Vector {
        self.face_areas[face.get()]
    }
}

impl DebugInvariants for PolyMeshView {
    fn validate_invariants(&self) -> Result<(), MeshCheckError> {
        let n_faces = self.neighbour.len();
        if self.owner.len() != n_faces {
            return Err(MeshCheckError::LengthMismatch {
                what: "owner list",
                expected: n_faces,
                found: self.owner.len(),
            });
        }
        if self.face_areas.len() != n_faces {
            return Err(MeshCheckError::LengthMismatch {
                what: "face area list",
                expected: n_faces,
                found: self.face_areas.len(),
            });
        }
        validate_mesh_view(self)
    }
}

static_assertions::assert_impl_all!(PolyMeshView: Send, Sync);
