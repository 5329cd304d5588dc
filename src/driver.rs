//! Per-snapshot check loop for a mesh that changes over time.
//!
//! The caller loads each snapshot, reports how it changed relative to the
//! previous one, and hands the current mesh to [`CheckDriver::check_snapshot`].
//! The first snapshot and any topology change trigger the full check set;
//! pure point motion triggers the geometric checks; unchanged snapshots are
//! skipped.

use crate::algs::communicator::Communicator;
use crate::check::{OrthogonalityChecker, OrthogonalityReport};
use crate::mesh_error::MeshCheckError;
use crate::topology::face_set::FaceSet;
use crate::topology::mesh_view::MeshView;
use std::io::Write;

/// How a snapshot differs from the one loaded before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum UpdateState {
    Unchanged,
    PointsMoved,
    TopoChange,
    TopoPatchChange,
}

impl UpdateState {
    pub fn topology_changed(self) -> bool {
        matches!(self, UpdateState::TopoChange | UpdateState::TopoPatchChange)
    }
}

/// Which checks a snapshot received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckScope {
    Skipped,
    /// Topology and geometry.
    Full,
    Geometry,
}

/// Result of one [`CheckDriver::check_snapshot`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOutcome {
    pub scope: CheckScope,
    /// Number of checks that failed on this snapshot.
    pub failed_checks: usize,
    pub report: Option<OrthogonalityReport>,
    /// Local ids of offending faces, when collection is enabled.
    pub offending: Option<FaceSet>,
}

impl SnapshotOutcome {
    pub fn evaluated(&self) -> bool {
        self.scope != CheckScope::Skipped
    }

    fn skipped() -> Self {
        Self {
            scope: CheckScope::Skipped,
            failed_checks: 0,
            report: None,
            offending: None,
        }
    }
}

/// Runs the mesh checks across a sequence of snapshots.
///
/// Collective when `comm` spans several ranks: every rank must present the
/// same sequence of snapshots and states. Text goes to `out` on the master
/// rank only.
#[derive(Debug)]
pub struct CheckDriver<C: Communicator> {
    checker: OrthogonalityChecker,
    comm: C,
    collect_offending: bool,
    total_failed: usize,
    n_evaluated: usize,
}

impl<C: Communicator> CheckDriver<C> {
    pub fn new(checker: OrthogonalityChecker, comm: C) -> Self {
        Self {
            checker,
            comm,
            collect_offending: false,
            total_failed: 0,
            n_evaluated: 0,
        }
    }

    /// Also return the offending faces of every evaluated snapshot.
    pub fn with_offending_faces(mut self, collect: bool) -> Self {
        self.collect_offending = collect;
        self
    }

    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// Failed checks summed over every snapshot so far.
    pub fn total_failed(&self) -> usize {
        self.total_failed
    }

    pub fn n_evaluated(&self) -> usize {
        self.n_evaluated
    }

    /// Check snapshot number `index` named `time_name`.
    pub fn check_snapshot<M, W>(
        &mut self,
        index: usize,
        time_name: &str,
        state: UpdateState,
        mesh: &M,
        out: &mut W,
    ) -> Result<SnapshotOutcome, MeshCheckError>
    where
        M: MeshView + ?Sized,
        W: Write + ?Sized,
    {
        let scope = if index == 0 || state.topology_changed() {
            CheckScope::Full
        } else if state == UpdateState::PointsMoved {
            CheckScope::Geometry
        } else {
            log::debug!("snapshot {time_name}: unchanged, skipping");
            return Ok(SnapshotOutcome::skipped());
        };
        log::debug!("snapshot {time_name} (#{index}): {state:?}, running {scope:?} check");

        let master = self.comm.is_master();
        if master {
            write!(out, "Time = {time_name}\n\n")?;
        }

        // Face orthogonality is the only check implemented, and it is a
        // geometric one, so both scopes run the same set.
        let mut offending = self.collect_offending.then(FaceSet::new);
        let report = self
            .checker
            .evaluate(mesh, &self.comm, offending.as_mut())?;
        if master {
            write!(out, "\n{report}")?;
        }
        let failed_checks = usize::from(report.has_errors());

        if master {
            if failed_checks == 0 {
                write!(out, "\nMesh OK.\n\n")?;
            } else {
                write!(out, "\nFailed {failed_checks} mesh checks.\n\n")?;
            }
        }

        self.total_failed += failed_checks;
        self.n_evaluated += 1;
        Ok(SnapshotOutcome {
            scope,
            failed_checks,
            report: Some(report),
            offending,
        })
    }

    /// Close the run. Returns the total number of failed checks.
    pub fn finish<W>(self, out: &mut W) -> Result<usize, MeshCheckError>
    where
        W: Write + ?Sized,
    {
        if self.comm.is_master() {
            write!(out, "End\n\n")?;
        }
        log::debug!(
            "{} snapshots checked, {} failed checks",
            self.n_evaluated,
            self.total_failed
        );
        Ok(self.total_failed)
    }
}
