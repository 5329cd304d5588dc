//! Basic mesh generators for structured hexahedral blocks.
//!
//! Generated meshes follow the face ordering quality checks expect: internal
//! faces first, sorted by owner and then by neighbour (upper-triangular
//! order), followed by boundary faces grouped by side
//! (`x-`, `x+`, `y-`, `y+`, `z-`, `z+`). All face normals point out of the
//! owner cell.

use crate::geometry::metrics::PolyMesh;
use crate::mesh_error::MeshCheckError;

fn invalid(message: impl Into<String>) -> MeshCheckError {
    MeshCheckError::InvalidConfig(message.into())
}

/// Axis-aligned block of `n[0] x n[1] x n[2]` hexahedra with the given cell
/// spacing, starting at the origin.
pub fn hex_block(n: [usize; 3], spacing: [f64; 3]) -> Result<PolyMesh, MeshCheckError> {
    if n.contains(&0) {
        return Err(invalid(format!(
            "hex block needs at least one cell per direction, got {n:?}"
        )));
    }
    if spacing.iter().any(|h| !h.is_finite() || *h <= 0.0) {
        return Err(invalid(format!(
            "hex block spacing must be positive and finite, got {spacing:?}"
        )));
    }
    let [nx, ny, nz] = n;

    let point = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
    let cell = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    // loops on the planes x = i, y = j, z = k with +x, +y, +z normals
    let x_face = |i, j, k| {
        vec![
            point(i, j, k),
            point(i, j + 1, k),
            point(i, j + 1, k + 1),
            point(i, j, k + 1),
        ]
    };
    let y_face = |i, j, k| {
        vec![
            point(i, j, k),
            point(i, j, k + 1),
            point(i + 1, j, k + 1),
            point(i + 1, j, k),
        ]
    };
    let z_face = |i, j, k| {
        vec![
            point(i, j, k),
            point(i + 1, j, k),
            point(i + 1, j + 1, k),
            point(i, j + 1, k),
        ]
    };
    let flipped = |mut f: Vec<usize>| {
        f.reverse();
        f
    };

    let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                points.push([
                    i as f64 * spacing[0],
                    j as f64 * spacing[1],
                    k as f64 * spacing[2],
                ]);
            }
        }
    }

    let mut faces = Vec::new();
    let mut owner = Vec::new();
    let mut neighbour = Vec::new();

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let c = cell(i, j, k);
                if i + 1 < nx {
                    faces.push(x_face(i + 1, j, k));
                    owner.push(c);
                    neighbour.push(cell(i + 1, j, k));
                }
                if j + 1 < ny {
                    faces.push(y_face(i, j + 1, k));
                    owner.push(c);
                    neighbour.push(cell(i, j + 1, k));
                }
                if k + 1 < nz {
                    faces.push(z_face(i, j, k + 1));
                    owner.push(c);
                    neighbour.push(cell(i, j, k + 1));
                }
            }
        }
    }

    for k in 0..nz {
        for j in 0..ny {
            faces.push(flipped(x_face(0, j, k)));
            owner.push(cell(0, j, k));
        }
    }
    for k in 0..nz {
        for j in 0..ny {
            faces.push(x_face(nx, j, k));
            owner.push(cell(nx - 1, j, k));
        }
    }
    for k in 0..nz {
        for i in 0..nx {
            faces.push(flipped(y_face(i, 0, k)));
            owner.push(cell(i, 0, k));
        }
    }
    for k in 0..nz {
        for i in 0..nx {
            faces.push(y_face(i, ny, k));
            owner.push(cell(i, ny - 1, k));
        }
    }
    for j in 0..ny {
        for i in 0..nx {
            faces.push(flipped(z_face(i, j, 0)));
            owner.push(cell(i, j, 0));
        }
    }
    for j in 0..ny {
        for i in 0..nx {
            faces.push(z_face(i, j, nz));
            owner.push(cell(i, j, nz - 1));
        }
    }

    PolyMesh::new(points, faces, owner, neighbour)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_for_small_block() {
        let mesh = hex_block([2, 3, 4], [1.0, 1.0, 1.0]).unwrap();
        assert_eq!(mesh.n_cells(), 24);
        assert_eq!(mesh.points().len(), 3 * 4 * 5);
        // internal: (nx-1) ny nz + nx (ny-1) nz + nx ny (nz-1)
        assert_eq!(mesh.n_internal_faces(), 12 + 16 + 18);
        // boundary: 2 (ny nz + nx nz + nx ny)
        assert_eq!(mesh.n_faces() - mesh.n_internal_faces(), 2 * (12 + 8 + 6));
    }

    #[test]
    fn internal_faces_are_upper_triangular() {
        let mesh = hex_block([3, 2, 2], [1.0, 1.0, 1.0]).unwrap();
        let n = mesh.n_internal_faces();
        let own = &mesh.owners()[..n];
        let nei = mesh.neighbours();
        for f in 0..n {
            assert!(own[f] < nei[f]);
            if f > 0 {
                assert!((own[f - 1], nei[f - 1]) < (own[f], nei[f]));
            }
        }
    }

    #[test]
    fn single_cell_has_no_internal_faces() {
        let mesh = hex_block([1, 1, 1], [2.0, 1.0, 0.5]).unwrap();
        assert_eq!(mesh.n_internal_faces(), 0);
        assert_eq!(mesh.n_faces(), 6);
    }

    #[test]
    fn rejects_empty_or_negative_blocks() {
        assert!(hex_block([0, 1, 1], [1.0; 3]).is_err());
        assert!(hex_block([1, 1, 1], [1.0, -1.0, 1.0]).is_err());
        assert!(hex_block([1, 1, 1], [1.0, f64::NAN, 1.0]).is_err());
    }
}
