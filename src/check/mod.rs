//! Face non-orthogonality check over a (possibly partitioned) mesh.
//!
//! Every rank evaluates its own internal faces, the aggregates are reduced
//! through a [`Communicator`], and only then is the result reported. The
//! text report is written by the master rank alone.

pub mod config;
pub mod report;

pub use config::OrthogonalityConfig;
pub use report::{HistogramBin, OrthogonalityReport};

use crate::algs::communicator::Communicator;
use crate::algs::reduction::all_reduce_stats;
use crate::geometry::orthogonality::{FaceClassifier, LocalOrthogonalityStats, accumulate_faces};
use crate::mesh_error::MeshCheckError;
use crate::topology::face_set::FaceSet;
use crate::topology::mesh_view::MeshView;
use std::io::Write;

/// Validated configuration plus the classifier derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthogonalityChecker {
    config: OrthogonalityConfig,
    classifier: FaceClassifier,
}

impl Default for OrthogonalityChecker {
    fn default() -> Self {
        let config = OrthogonalityConfig::default();
        let classifier = config.classifier();
        Self { config, classifier }
    }
}

impl OrthogonalityChecker {
    pub fn new(config: OrthogonalityConfig) -> Result<Self, MeshCheckError> {
        config.validate()?;
        let classifier = config.classifier();
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &OrthogonalityConfig {
        &self.config
    }

    pub fn classifier(&self) -> &FaceClassifier {
        &self.classifier
    }

    /// Evaluate every internal face and reduce across `comm`.
    ///
    /// Collective: all ranks of `comm` must call this. Local ids of severe
    /// and error faces are inserted into `collector` when given.
    pub fn evaluate<M, C>(
        &self,
        mesh: &M,
        comm: &C,
        collector: Option<&mut FaceSet>,
    ) -> Result<OrthogonalityReport, MeshCheckError>
    where
        M: MeshView + ?Sized,
        C: Communicator + ?Sized,
    {
        crate::debug_invariants!(
            crate::topology::mesh_view::validate_mesh_view(mesh),
            "mesh view"
        );
        let local = accumulate_faces(mesh, &self.classifier, collector);
        self.reduce(&local, comm)
    }

    /// [`evaluate`](Self::evaluate) with the local pass spread over Rayon's
    /// thread pool.
    #[cfg(feature = "rayon")]
    pub fn evaluate_par<M, C>(
        &self,
        mesh: &M,
        comm: &C,
        collector: Option<&mut FaceSet>,
    ) -> Result<OrthogonalityReport, MeshCheckError>
    where
        M: MeshView + Sync + ?Sized,
        C: Communicator + ?Sized,
    {
        crate::debug_invariants!(
            crate::topology::mesh_view::validate_mesh_view(mesh),
            "mesh view"
        );
        let local =
            crate::geometry::orthogonality::accumulate_faces_par(mesh, &self.classifier, collector);
        self.reduce(&local, comm)
    }

    fn reduce<C>(
        &self,
        local: &LocalOrthogonalityStats,
        comm: &C,
    ) -> Result<OrthogonalityReport, MeshCheckError>
    where
        C: Communicator + ?Sized,
    {
        log::debug!(
            "rank {}/{}: {} internal faces, {} severe, {} errors before reduction",
            comm.rank(),
            comm.size(),
            local.n_faces,
            local.n_severe,
            local.n_errors
        );
        let global = all_reduce_stats(local, comm)?;
        let report = OrthogonalityReport::from_stats(&global, &self.config);
        if report.has_errors() && comm.is_master() {
            log::warn!(
                "{} of {} internal faces have non-orthogonality errors",
                report.n_errors,
                report.n_faces
            );
        }
        Ok(report)
    }

    /// Run the check and print the report to stdout on the master rank.
    ///
    /// Returns `true` when any face is an error; severe faces alone do not
    /// fail the check.
    pub fn check_face_orthogonality<M, C>(
        &self,
        mesh: &M,
        comm: &C,
        report: bool,
        collector: Option<&mut FaceSet>,
    ) -> Result<bool, MeshCheckError>
    where
        M: MeshView + ?Sized,
        C: Communicator + ?Sized,
    {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.check_face_orthogonality_to(mesh, comm, report, collector, &mut out)
    }

    /// [`check_face_orthogonality`](Self::check_face_orthogonality) writing
    /// the report to `out`.
    pub fn check_face_orthogonality_to<M, C, W>(
        &self,
        mesh: &M,
        comm: &C,
        report: bool,
        collector: Option<&mut FaceSet>,
        out: &mut W,
    ) -> Result<bool, MeshCheckError>
    where
        M: MeshView + ?Sized,
        C: Communicator + ?Sized,
        W: Write + ?Sized,
    {
        let result = self.evaluate(mesh, comm, collector)?;
        if report && comm.is_master() {
            write!(out, "\n{result}")?;
        }
        Ok(result.has_errors())
    }
}
