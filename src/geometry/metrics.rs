//! Face and cell geometry for polyhedral meshes.
//!
//! A [`PolyMesh`] is described face-by-face: every face is a closed loop of
//! point indices, oriented so that its right-hand normal points out of the
//! owner cell. Internal faces come first and carry a neighbour; the remaining
//! faces are boundary faces with an owner only.
//!
//! Face centres and area vectors use a triangle fan about the point average;
//! cell centres and volumes use a pyramid decomposition about the average of
//! the cell's face centres. Both fall back to the plain estimate when the
//! weighted sum is numerically zero, so degenerate faces and cells never
//! produce NaN.

use crate::mesh_error::MeshCheckError;
use crate::topology::ids::{CellId, FaceId};
use crate::topology::mesh_view::PolyMeshView;
use crate::geometry::vector::{Vector, ZERO, add, average, cross, dot, mag, scale, sub};
use itertools::Itertools;

const VSMALL: f64 = 1.0e-300;
const ROOT_VSMALL: f64 = 1.0e-150;

/// Centre and area vector of a single face.
///
/// `face` lists point indices into `points`; callers guarantee they are in
/// range and that the face has at least three points.
pub fn face_centre_and_area(points: &[Vector], face: &[usize]) -> (Vector, Vector) {
    if face.len() == 3 {
        let (p0, p1, p2) = (points[face[0]], points[face[1]], points[face[2]]);
        let centre = scale(add(add(p0, p1), p2), 1.0 / 3.0);
        let area = scale(cross(sub(p1, p0), sub(p2, p0)), 0.5);
        return (centre, area);
    }

    let estimate = average(face.iter().map(|&p| points[p]));
    let mut sum_n = ZERO;
    let mut sum_a = 0.0;
    let mut sum_ac = ZERO;
    for (&a, &b) in face.iter().circular_tuple_windows() {
        let (pa, pb) = (points[a], points[b]);
        let c = add(add(pa, pb), estimate);
        let n = cross(sub(pb, pa), sub(estimate, pa));
        let area = mag(n);
        sum_n = add(sum_n, n);
        sum_a += area;
        sum_ac = add(sum_ac, scale(c, area));
    }

    let centre = if sum_a < ROOT_VSMALL {
        estimate
    } else {
        scale(sum_ac, 1.0 / (3.0 * sum_a))
    };
    (centre, scale(sum_n, 0.5))
}

/// Per-face centres and area vectors for every face of a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceGeometry {
    pub centres: Vec<Vector>,
    pub areas: Vec<Vector>,
}

/// Per-cell centres and volumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGeometry {
    pub centres: Vec<Vector>,
    pub volumes: Vec<f64>,
}

/// Polyhedral mesh described by points, face loops and owner/neighbour labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyMesh {
    points: Vec<Vector>,
    faces: Vec<Vec<usize>>,
    owner: Vec<CellId>,
    neighbour: Vec<CellId>,
    n_cells: usize,
}

impl PolyMesh {
    /// Build and validate a mesh.
    ///
    /// `owner` has one entry per face; `neighbour` one entry per internal face,
    /// and internal faces are the first `neighbour.len()` faces.
    pub fn new(
        points: Vec<Vector>,
        faces: Vec<Vec<usize>>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
    ) -> Result<Self, MeshCheckError> {
        if owner.len() != faces.len() {
            return Err(MeshCheckError::LengthMismatch {
                what: "owner list",
                expected: faces.len(),
                found: owner.len(),
            });
        }
        if neighbour.len() > faces.len() {
            return Err(MeshCheckError::LengthMismatch {
                what: "neighbour list",
                expected: faces.len(),
                found: neighbour.len(),
            });
        }
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshCheckError::DegenerateFace {
                    face: FaceId::new(i),
                    n_points: face.len(),
                });
            }
            if let Some(&point) = face.iter().find(|&&p| p >= points.len()) {
                return Err(MeshCheckError::PointOutOfRange {
                    face: FaceId::new(i),
                    point,
                    n_points: points.len(),
                });
            }
        }
        for (i, (&own, &nei)) in owner.iter().zip(&neighbour).enumerate() {
            if own == nei {
                return Err(MeshCheckError::SelfNeighbour {
                    face: FaceId::new(i),
                    cell: CellId::new(own),
                });
            }
        }
        let n_cells = owner
            .iter()
            .chain(&neighbour)
            .max()
            .map_or(0, |&c| c + 1);
        Ok(Self {
            points,
            faces,
            owner: owner.into_iter().map(CellId::new).collect(),
            neighbour: neighbour.into_iter().map(CellId::new).collect(),
            n_cells,
        })
    }

    #[inline]
    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    #[inline]
    pub fn owners(&self) -> &[CellId] {
        &self.owner
    }

    #[inline]
    pub fn neighbours(&self) -> &[CellId] {
        &self.neighbour
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Move every point through `f`. Connectivity is unchanged.
    pub fn transform_points<F>(&mut self, mut f: F)
    where
        F: FnMut(Vector) -> Vector,
    {
        for p in &mut self.points {
            *p = f(*p);
        }
    }

    pub fn face_geometry(&self) -> FaceGeometry {
        let (centres, areas) = self
            .faces
            .iter()
            .map(|face| face_centre_and_area(&self.points, face))
            .unzip();
        FaceGeometry { centres, areas }
    }

    /// Cell centres and volumes from previously computed face geometry.
    ///
    /// `faces` must come from [`PolyMesh::face_geometry`] on this mesh.
    pub fn cell_geometry(&self, faces: &FaceGeometry) -> CellGeometry {
        let n = self.n_cells;

        let mut estimate = vec![ZERO; n];
        let mut n_cell_faces = vec![0usize; n];
        for (f, &own) in self.owner.iter().enumerate() {
            estimate[own.get()] = add(estimate[own.get()], faces.centres[f]);
            n_cell_faces[own.get()] += 1;
        }
        for (f, &nei) in self.neighbour.iter().enumerate() {
            estimate[nei.get()] = add(estimate[nei.get()], faces.centres[f]);
            n_cell_faces[nei.get()] += 1;
        }
        for (c, count) in n_cell_faces.iter().enumerate() {
            if *count > 0 {
                estimate[c] = scale(estimate[c], 1.0 / *count as f64);
            }
        }

        let mut centres = vec![ZERO; n];
        let mut volumes = vec![0.0; n];
        let mut accumulate = |cell: usize, f: usize, outward: f64| {
            let fc = faces.centres[f];
            let pyr3_vol = (outward * dot(faces.areas[f], sub(fc, estimate[cell]))).max(VSMALL);
            let pc = add(scale(fc, 0.75), scale(estimate[cell], 0.25));
            centres[cell] = add(centres[cell], scale(pc, pyr3_vol));
            volumes[cell] += pyr3_vol;
        };
        for (f, &own) in self.owner.iter().enumerate() {
            accumulate(own.get(), f, 1.0);
        }
        for (f, &nei) in self.neighbour.iter().enumerate() {
            accumulate(nei.get(), f, -1.0);
        }

        for c in 0..n {
            centres[c] = if volumes[c].abs() > VSMALL {
                scale(centres[c], 1.0 / volumes[c])
            } else {
                estimate[c]
            };
            volumes[c] /= 3.0;
        }
        CellGeometry { centres, volumes }
    }

    /// Derive the internal-face view used by quality checks.
    pub fn to_view(&self) -> Result<PolyMeshView, MeshCheckError> {
        let faces = self.face_geometry();
        let cells = self.cell_geometry(&faces);
        let n_internal = self.n_internal_faces();
        let mut areas = faces.areas;
        areas.truncate(n_internal);
        PolyMeshView::new(
            cells.centres,
            areas,
            self.owner[..n_internal].to_vec(),
            self.neighbour.clone(),
        )
    }
}
