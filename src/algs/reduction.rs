//! Global reduction of per-partition orthogonality aggregates.
//!
//! Counts travel in a single `u64` sum-reduction laid out as
//! `[bins.., n_faces, n_severe, n_errors]`; the metric sum and minimum need
//! one `f64` reduction each because they use different operations.

use crate::algs::communicator::{CommError, Communicator, ReduceOp};
use crate::geometry::orthogonality::LocalOrthogonalityStats;

/// Combine `local` across all ranks of `comm`.
///
/// Collective: every rank must call it with the same bin count. The returned
/// aggregates are identical on every rank.
pub fn all_reduce_stats<C>(
    local: &LocalOrthogonalityStats,
    comm: &C,
) -> Result<LocalOrthogonalityStats, CommError>
where
    C: Communicator + ?Sized,
{
    let n_bins = local.bins.len();

    let mut counts = Vec::with_capacity(n_bins + 3);
    counts.extend_from_slice(&local.bins);
    counts.extend([local.n_faces, local.n_severe, local.n_errors]);
    comm.all_reduce_u64(&mut counts, ReduceOp::Sum)?;

    let mut sum = [local.sum_metric];
    comm.all_reduce_f64(&mut sum, ReduceOp::Sum)?;
    let mut min = [local.min_metric];
    comm.all_reduce_f64(&mut min, ReduceOp::Min)?;

    Ok(LocalOrthogonalityStats {
        bins: counts[..n_bins].to_vec(),
        n_faces: counts[n_bins],
        n_severe: counts[n_bins + 1],
        n_errors: counts[n_bins + 2],
        sum_metric: sum[0],
        min_metric: min[0],
    })
}

impl LocalOrthogonalityStats {
    /// Method form of [`all_reduce_stats`].
    pub fn all_reduce<C>(&self, comm: &C) -> Result<Self, CommError>
    where
        C: Communicator + ?Sized,
    {
        all_reduce_stats(self, comm)
    }
}

/// Serial equivalent of [`all_reduce_stats`] over partitions held in memory.
///
/// Partitions are folded in order, matching the rank-ordered combination of
/// [`LocalComm`](crate::algs::communicator::LocalComm).
pub fn reduce_partitions<'a, I>(n_bins: usize, parts: I) -> LocalOrthogonalityStats
where
    I: IntoIterator<Item = &'a LocalOrthogonalityStats>,
{
    parts
        .into_iter()
        .fold(LocalOrthogonalityStats::empty(n_bins), |mut acc, s| {
            acc.merge(s);
            acc
        })
}
