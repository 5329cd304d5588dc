//! Face non-orthogonality metric and per-partition accumulation.
//!
//! For an internal face with owner centre `Co`, neighbour centre `Cn` and area
//! vector `S`, the metric is the cosine of the angle between `d = Cn - Co` and
//! `S`:
//!
//! ```text
//! m = (d · S) / (|d| |S| + eps)
//! ```
//!
//! `m = 1` is a perfectly orthogonal face. The stabilizer `eps` keeps
//! zero-length vectors from dividing by zero; such faces come out with
//! `m = 0` and are classified as errors.
//!
//! Rounding can push the ratio a hair past 1 for parallel vectors (for
//! `d = S = (1, 1, 1)` it evaluates to `1.0000000000000002`). The metric is
//! clamped into `[-1, 1]`, so such faces land in the first bin.
//!
//! Histogram bins are closed cosine intervals `[cos((k+1) w), cos(k w)]`
//! scanned from `k = 0`; a metric on a shared boundary lands in the
//! more-orthogonal bin because the scan stops at the first match.

use crate::geometry::vector::{Vector, dot, mag, sub};
use crate::topology::face_set::FaceSet;
use crate::topology::ids::FaceId;
use crate::topology::mesh_view::MeshView;

/// Default stabilizer added to the denominator of the metric.
pub const DEFAULT_STABILIZER: f64 = 1.0e-300;
/// Default guard separating severe faults (`m > guard`) from errors.
pub const DEFAULT_DEGENERATE_GUARD: f64 = 1.0e-15;

/// Cosine between `d` and `s`, stabilized and clamped to `[-1, 1]`.
#[inline]
pub fn face_orthogonality(d: Vector, s: Vector, stabilizer: f64) -> f64 {
    (dot(d, s) / (mag(d) * mag(s) + stabilizer)).clamp(-1.0, 1.0)
}

/// Metric of internal face `face` of `mesh`.
#[inline]
pub fn mesh_face_orthogonality<M>(mesh: &M, face: FaceId, stabilizer: f64) -> f64
where
    M: MeshView + ?Sized,
{
    let d = sub(
        mesh.cell_centre(mesh.neighbour(face)),
        mesh.cell_centre(mesh.owner(face)),
    );
    face_orthogonality(d, mesh.face_area(face), stabilizer)
}

/// Angle in degrees corresponding to a metric value.
#[inline]
pub fn metric_to_angle_deg(metric: f64) -> f64 {
    metric.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Equal-width angular bins expressed as cosine bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct OrthogonalityBins {
    bin_width_deg: f64,
    /// `bounds[k] = cos(k * width)`, `n_bins + 1` entries, decreasing.
    bounds: Vec<f64>,
}

impl OrthogonalityBins {
    pub fn new(n_bins: usize, bin_width_deg: f64) -> Self {
        let bounds = (0..=n_bins)
            .map(|k| (k as f64 * bin_width_deg).to_radians().cos())
            .collect();
        Self {
            bin_width_deg,
            bounds,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn bin_width_deg(&self) -> f64 {
        self.bin_width_deg
    }

    /// Cosine bound of the more-orthogonal edge of bin `k`.
    #[inline]
    pub fn upper_bound(&self, k: usize) -> f64 {
        self.bounds[k]
    }

    /// Cosine bound of the less-orthogonal edge of bin `k`.
    #[inline]
    pub fn lower_bound(&self, k: usize) -> f64 {
        self.bounds[k + 1]
    }

    /// Angle (degrees) at which bin `k` starts.
    #[inline]
    pub fn start_angle_deg(&self, k: usize) -> f64 {
        k as f64 * self.bin_width_deg
    }

    /// First bin whose closed interval contains `metric`.
    pub fn bin_of(&self, metric: f64) -> Option<usize> {
        (0..self.len()).find(|&k| self.lower_bound(k) <= metric && metric <= self.upper_bound(k))
    }
}

/// Fault class of a single face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FaultClass {
    /// Within tolerance.
    Ok,
    /// Beyond the severity threshold but above the degenerate guard.
    Severe,
    /// At or below the degenerate guard.
    Error,
}

impl FaultClass {
    #[inline]
    pub fn is_fault(self) -> bool {
        !matches!(self, FaultClass::Ok)
    }
}

/// Thresholds and bins applied to every face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceClassifier {
    bins: OrthogonalityBins,
    severe_cos: f64,
    degenerate_guard: f64,
    stabilizer: f64,
}

impl FaceClassifier {
    pub fn new(
        severe_threshold_deg: f64,
        n_bins: usize,
        bin_width_deg: f64,
        degenerate_guard: f64,
        stabilizer: f64,
    ) -> Self {
        Self {
            bins: OrthogonalityBins::new(n_bins, bin_width_deg),
            severe_cos: severe_threshold_deg.to_radians().cos(),
            degenerate_guard,
            stabilizer,
        }
    }

    #[inline]
    pub fn bins(&self) -> &OrthogonalityBins {
        &self.bins
    }

    /// Cosine of the severity threshold angle.
    #[inline]
    pub fn severe_cos(&self) -> f64 {
        self.severe_cos
    }

    #[inline]
    pub fn degenerate_guard(&self) -> f64 {
        self.degenerate_guard
    }

    #[inline]
    pub fn stabilizer(&self) -> f64 {
        self.stabilizer
    }

    #[inline]
    pub fn classify(&self, metric: f64) -> FaultClass {
        if metric < self.severe_cos {
            if metric > self.degenerate_guard {
                FaultClass::Severe
            } else {
                FaultClass::Error
            }
        } else {
            FaultClass::Ok
        }
    }
}

/// Aggregates of one partition, before or after reduction.
///
/// Every field combines associatively: counts and `sum_metric` by addition,
/// `min_metric` by minimum (identity `+inf`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocalOrthogonalityStats {
    pub bins: Vec<u64>,
    pub n_faces: u64,
    pub min_metric: f64,
    pub sum_metric: f64,
    pub n_severe: u64,
    pub n_errors: u64,
}

impl LocalOrthogonalityStats {
    /// Identity element for `n_bins` bins.
    pub fn empty(n_bins: usize) -> Self {
        Self {
            bins: vec![0; n_bins],
            n_faces: 0,
            min_metric: f64::INFINITY,
            sum_metric: 0.0,
            n_severe: 0,
            n_errors: 0,
        }
    }

    /// Record one face. Returns its fault class.
    #[inline]
    pub fn record(&mut self, classifier: &FaceClassifier, metric: f64) -> FaultClass {
        if let Some(k) = classifier.bins().bin_of(metric) {
            self.bins[k] += 1;
        }
        let class = classifier.classify(metric);
        match class {
            FaultClass::Severe => self.n_severe += 1,
            FaultClass::Error => self.n_errors += 1,
            FaultClass::Ok => {}
        }
        self.min_metric = self.min_metric.min(metric);
        self.sum_metric += metric;
        self.n_faces += 1;
        class
    }

    /// Fold `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.bins.len(), other.bins.len());
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            *a += *b;
        }
        self.n_faces += other.n_faces;
        self.min_metric = self.min_metric.min(other.min_metric);
        self.sum_metric += other.sum_metric;
        self.n_severe += other.n_severe;
        self.n_errors += other.n_errors;
    }

    /// Faces that landed in some bin.
    pub fn n_binned(&self) -> u64 {
        self.bins.iter().sum()
    }
}

/// Evaluate every internal face of `mesh` sequentially.
///
/// Offending faces (severe or error) are inserted into `collector` when given.
pub fn accumulate_faces<M>(
    mesh: &M,
    classifier: &FaceClassifier,
    mut collector: Option<&mut FaceSet>,
) -> LocalOrthogonalityStats
where
    M: MeshView + ?Sized,
{
    let mut stats = LocalOrthogonalityStats::empty(classifier.bins().len());
    for face in mesh.internal_faces() {
        let metric = mesh_face_orthogonality(mesh, face, classifier.stabilizer());
        let class = stats.record(classifier, metric);
        if class.is_fault() {
            log::trace!("face {face}: metric {metric:.6} classified {class:?}");
            if let Some(set) = collector.as_deref_mut() {
                set.insert(face);
            }
        }
    }
    stats
}

/// Evaluate every internal face of `mesh` with Rayon.
///
/// Counts, minimum and the offending set match [`accumulate_faces`];
/// `sum_metric` may differ in the last bits because of reassociation.
#[cfg(feature = "rayon")]
pub fn accumulate_faces_par<M>(
    mesh: &M,
    classifier: &FaceClassifier,
    collector: Option<&mut FaceSet>,
) -> LocalOrthogonalityStats
where
    M: MeshView + Sync + ?Sized,
{
    use rayon::prelude::*;

    let n_bins = classifier.bins().len();
    let collect = collector.is_some();
    let (stats, offending) = (0..mesh.n_internal_faces())
        .into_par_iter()
        .map(FaceId::new)
        .fold(
            || (LocalOrthogonalityStats::empty(n_bins), Vec::new()),
            |(mut stats, mut offending), face| {
                let metric = mesh_face_orthogonality(mesh, face, classifier.stabilizer());
                if stats.record(classifier, metric).is_fault() && collect {
                    offending.push(face);
                }
                (stats, offending)
            },
        )
        .reduce(
            || (LocalOrthogonalityStats::empty(n_bins), Vec::new()),
            |(mut a, mut fa), (b, fb)| {
                a.merge(&b);
                fa.extend(fb);
                (a, fa)
            },
        );
    if let Some(set) = collector {
        set.extend(offending);
    }
    stats
}
