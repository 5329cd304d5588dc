#![allow(dead_code)]
use mesh_ortho_check::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::thread;

/// A row of cells along x; internal face `i` joins cells `i` and `i + 1` and
/// its unit area vector makes metric `metrics[i]` with the x axis.
pub fn faces_with_metrics(metrics: &[f64]) -> PolyMeshView {
    let n = metrics.len();
    let centres = (0..=n).map(|i| [i as f64, 0.0, 0.0]).collect();
    let areas = metrics
        .iter()
        .map(|&m| [m, (1.0 - m * m).max(0.0).sqrt(), 0.0])
        .collect();
    let owner: Vec<usize> = (0..n).collect();
    let neighbour: Vec<usize> = (1..=n).collect();
    PolyMeshView::from_labels(centres, areas, &owner, &neighbour).unwrap()
}

/// Hex block with `x += shear * y`; side faces then sit at `atan(shear)`.
pub fn sheared_block(n: [usize; 3], shear: f64) -> PolyMesh {
    let mut mesh = hex_block(n, [1.0, 1.0, 1.0]).unwrap();
    mesh.transform_points(|[x, y, z]| [x + shear * y, y, z]);
    mesh
}

/// Random cell centres and face areas; a few faces get a zero area vector.
pub fn random_view(n_cells: usize, n_faces: usize, seed: u64) -> PolyMeshView {
    let mut rng = SmallRng::seed_from_u64(seed);
    let vec3 = |rng: &mut SmallRng| -> [f64; 3] {
        [
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        ]
    };
    let centres = (0..n_cells).map(|_| vec3(&mut rng)).collect();
    let areas = (0..n_faces)
        .map(|_| {
            if rng.gen_bool(0.05) {
                [0.0; 3]
            } else {
                vec3(&mut rng)
            }
        })
        .collect();
    let mut owner = Vec::with_capacity(n_faces);
    let mut neighbour = Vec::with_capacity(n_faces);
    for _ in 0..n_faces {
        let o = rng.gen_range(0..n_cells);
        let mut n = rng.gen_range(0..n_cells - 1);
        if n >= o {
            n += 1;
        }
        owner.push(o);
        neighbour.push(n);
    }
    PolyMeshView::from_labels(centres, areas, &owner, &neighbour).unwrap()
}

/// Evaluate each partition on its own thread, connected by a [`LocalComm`]
/// group. Returns every rank's report and its offending faces in source ids.
pub fn run_partitioned(
    checker: &OrthogonalityChecker,
    parts: &[Partition],
) -> Vec<(OrthogonalityReport, Vec<FaceId>)> {
    let comms = LocalComm::group(parts.len());
    thread::scope(|s| {
        let handles: Vec<_> = parts
            .iter()
            .zip(comms)
            .map(|(part, comm)| {
                s.spawn(move || {
                    let mut set = FaceSet::new();
                    let report = checker.evaluate(&part.view, &comm, Some(&mut set)).unwrap();
                    let global = set.iter().map(|f| part.global_face(f)).collect();
                    (report, global)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * (1.0 + a.abs().max(b.abs()))
}
