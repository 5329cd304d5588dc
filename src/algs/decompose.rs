//! Split a mesh view into partition-local views.
//!
//! Each internal face goes to exactly one partition. A partition carries the
//! centres of every cell its faces touch, so cells on a partition interface
//! appear in more than one partition while faces never do. This is enough to
//! evaluate per-face quality metrics independently per partition and reduce
//! the results, e.g. one partition per [`LocalComm`](crate::algs::communicator::LocalComm)
//! rank.

use crate::mesh_error::MeshCheckError;
use crate::topology::ids::{CellId, FaceId};
use crate::topology::mesh_view::{MeshView, PolyMeshView};
use hashbrown::HashMap;

/// A partition-local view plus addressing back to the source mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Partition {
    pub view: PolyMeshView,
    /// Source face of each local face.
    pub face_addressing: Vec<FaceId>,
    /// Source cell of each local cell.
    pub cell_addressing: Vec<CellId>,
}

impl Partition {
    /// Map a local face id back to the source mesh.
    #[inline]
    pub fn global_face(&self, local: FaceId) -> FaceId {
        self.face_addressing[local.get()]
    }
}

/// Assign internal face `f` to partition `face_parts[f]`.
///
/// Local faces keep the source order; local cells are numbered by first use.
pub fn decompose_faces<M>(
    mesh: &M,
    face_parts: &[usize],
    n_parts: usize,
) -> Result<Vec<Partition>, MeshCheckError>
where
    M: MeshView + ?Sized,
{
    let n_faces = mesh.n_internal_faces();
    if face_parts.len() != n_faces {
        return Err(MeshCheckError::LengthMismatch {
            what: "face partition map",
            expected: n_faces,
            found: face_parts.len(),
        });
    }
    if let Some((index, &part)) = face_parts.iter().enumerate().find(|(_, p)| **p >= n_parts) {
        return Err(MeshCheckError::PartitionOutOfRange {
            index,
            part,
            n_parts,
        });
    }

    let mut builders: Vec<Builder> = (0..n_parts).map(|_| Builder::default()).collect();
    for face in mesh.internal_faces() {
        builders[face_parts[face.get()]].push(mesh, face);
    }
    builders.into_iter().map(Builder::finish).collect()
}

/// Assign each internal face to the partition of its owner cell.
pub fn decompose_by_owner<M>(
    mesh: &M,
    cell_parts: &[usize],
    n_parts: usize,
) -> Result<Vec<Partition>, MeshCheckError>
where
    M: MeshView + ?Sized,
{
    if cell_parts.len() != mesh.n_cells() {
        return Err(MeshCheckError::LengthMismatch {
            what: "cell partition map",
            expected: mesh.n_cells(),
            found: cell_parts.len(),
        });
    }
    let face_parts: Vec<usize> = mesh
        .internal_faces()
        .map(|f| cell_parts[mesh.owner(f).get()])
        .collect();
    decompose_faces(mesh, &face_parts, n_parts)
}

#[derive(Default)]
struct Builder {
    local_cell: HashMap<CellId, CellId>,
    cell_addressing: Vec<CellId>,
    centres: Vec<[f64; 3]>,
    face_addressing: Vec<FaceId>,
    areas: Vec<[f64; 3]>,
    owner: Vec<CellId>,
    neighbour: Vec<CellId>,
}

impl Builder {
    fn cell<M: MeshView + ?Sized>(&mut self, mesh: &M, global: CellId) -> CellId {
        if let Some(&local) = self.local_cell.get(&global) {
            return local;
        }
        let local = CellId::new(self.cell_addressing.len());
        self.local_cell.insert(global, local);
        self.cell_addressing.push(global);
        self.centres.push(mesh.cell_centre(global));
        local
    }

    fn push<M: MeshView + ?Sized>(&mut self, mesh: &M, face: FaceId) {
        let own = self.cell(mesh, mesh.owner(face));
        let nei = self.cell(mesh, mesh.neighbour(face));
        self.face_addressing.push(face);
        self.areas.push(mesh.face_area(face));
        self.owner.push(own);
        self.neighbour.push(nei);
    }

    fn finish(self) -> Result<Partition, MeshCheckError> {
        Ok(Partition {
            view: PolyMeshView::new(self.centres, self.areas, self.owner, self.neighbour)?,
            face_addressing: self.face_addressing,
            cell_addressing: self.cell_addressing,
        })
    }
}
