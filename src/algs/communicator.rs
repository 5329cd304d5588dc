//! Thin façade over serial, intra-process (threads) or inter-process (MPI)
//! collective reductions.
//!
//! Every rank calls the same sequence of collectives with buffers of the same
//! length; each call blocks until all ranks have contributed and returns the
//! combined values to every rank. No rank observes a partial result.

use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use thiserror::Error;

/// Associative, commutative combining operation for a reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    Sum,
    Min,
}

impl ReduceOp {
    #[inline]
    pub fn combine_u64(self, a: u64, b: u64) -> u64 {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Min => a.min(b),
        }
    }

    #[inline]
    pub fn combine_f64(self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Min => a.min(b),
        }
    }
}

/// Errors raised by collective communication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommError {
    /// Ranks entered the same collective with buffers of different lengths.
    #[error("rank {rank} contributed {found} values to a reduction of length {expected}")]
    LengthMismatch {
        rank: usize,
        expected: usize,
        found: usize,
    },
    /// The MPI environment could not be initialized (or was already).
    #[error("MPI initialization failed")]
    MpiInit,
}

/// Collective reduction interface.
pub trait Communicator {
    /// Rank of this worker in `0..size()`.
    fn rank(&self) -> usize;
    /// Number of participating workers.
    fn size(&self) -> usize;

    /// Rank 0 owns user-facing output.
    fn is_master(&self) -> bool {
        self.rank() == 0
    }

    /// Combine `values` element-wise across all ranks, in place.
    fn all_reduce_u64(&self, values: &mut [u64], op: ReduceOp) -> Result<(), CommError>;

    /// Combine `values` element-wise across all ranks, in place.
    fn all_reduce_f64(&self, values: &mut [f64], op: ReduceOp) -> Result<(), CommError>;
}

/// Compile-time no-op comm for serial runs: every reduction is the identity.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn all_reduce_u64(&self, _values: &mut [u64], _op: ReduceOp) -> Result<(), CommError> {
        Ok(())
    }
    fn all_reduce_f64(&self, _values: &mut [f64], _op: ReduceOp) -> Result<(), CommError> {
        Ok(())
    }
}

// --- LocalComm: intra-process / multi-thread ---

struct Exchange {
    u64_slots: Mutex<Vec<Vec<u64>>>,
    f64_slots: Mutex<Vec<Vec<f64>>>,
    barrier: Barrier,
}

/// Shared-memory communicator for ranks running as threads of one process.
///
/// Each reduction deposits the local buffer, waits on a barrier, combines all
/// contributions in rank order and waits again before returning, so every
/// rank receives a bit-identical result. All ranks of a group must take part
/// in every collective, otherwise the others block forever.
#[derive(Clone)]
pub struct LocalComm {
    rank: usize,
    size: usize,
    shared: Arc<Exchange>,
}

impl std::fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

impl LocalComm {
    /// Create `size` connected handles; handle `r` has rank `r`.
    pub fn group(size: usize) -> Vec<LocalComm> {
        let shared = Arc::new(Exchange {
            u64_slots: Mutex::new(vec![Vec::new(); size]),
            f64_slots: Mutex::new(vec![Vec::new(); size]),
            barrier: Barrier::new(size.max(1)),
        });
        (0..size)
            .map(|rank| LocalComm {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }

    fn exchange<T, F>(
        &self,
        slots: &Mutex<Vec<Vec<T>>>,
        values: &mut [T],
        combine: F,
    ) -> Result<(), CommError>
    where
        T: Copy,
        F: Fn(T, T) -> T,
    {
        {
            let mut guard = slots.lock();
            let mine = &mut guard[self.rank];
            mine.clear();
            mine.extend_from_slice(values);
        }
        self.shared.barrier.wait();

        let combined = {
            let guard = slots.lock();
            let expected = values.len();
            match guard
                .iter()
                .enumerate()
                .find(|(_, contribution)| contribution.len() != expected)
            {
                Some((rank, contribution)) => Err(CommError::LengthMismatch {
                    rank,
                    expected,
                    found: contribution.len(),
                }),
                None => {
                    let mut acc = guard[0].clone();
                    for contribution in &guard[1..] {
                        for (a, &b) in acc.iter_mut().zip(contribution) {
                            *a = combine(*a, b);
                        }
                    }
                    Ok(acc)
                }
            }
        };

        // nobody may overwrite a slot until every rank has read all of them
        self.shared.barrier.wait();
        values.copy_from_slice(&combined?);
        Ok(())
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn all_reduce_u64(&self, values: &mut [u64], op: ReduceOp) -> Result<(), CommError> {
        self.exchange(&self.shared.u64_slots, values, |a, b| op.combine_u64(a, b))
    }
    fn all_reduce_f64(&self, values: &mut [f64], op: ReduceOp) -> Result<(), CommError> {
        self.exchange(&self.shared.f64_slots, values, |a, b| op.combine_f64(a, b))
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::{CommError, Communicator, ReduceOp};
    use mpi::collective::SystemOperation;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{Communicator as _, CommunicatorCollectives as _};

    /// MPI world communicator. Dropping it finalizes MPI.
    pub struct MpiComm {
        _universe: Universe,
        pub world: SimpleCommunicator,
        rank: usize,
        size: usize,
    }

    impl MpiComm {
        pub fn new() -> Result<Self, CommError> {
            let universe = mpi::initialize().ok_or(CommError::MpiInit)?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Ok(Self {
                _universe: universe,
                world,
                rank,
                size,
            })
        }
    }

    fn system_op(op: ReduceOp) -> SystemOperation {
        match op {
            ReduceOp::Sum => SystemOperation::sum(),
            ReduceOp::Min => SystemOperation::min(),
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.size
        }
        fn all_reduce_u64(&self, values: &mut [u64], op: ReduceOp) -> Result<(), CommError> {
            let send = values.to_vec();
            self.world.all_reduce_into(&send[..], values, system_op(op));
            Ok(())
        }
        fn all_reduce_f64(&self, values: &mut [f64], op: ReduceOp) -> Result<(), CommError> {
            let send = values.to_vec();
            self.world.all_reduce_into(&send[..], values, system_op(op));
            Ok(())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn no_comm_is_identity() {
        let comm = NoComm;
        assert!(comm.is_master());
        assert_eq!(comm.size(), 1);
        let mut v = [3u64, 4];
        comm.all_reduce_u64(&mut v, ReduceOp::Sum).unwrap();
        assert_eq!(v, [3, 4]);
    }

    #[test]
    fn local_group_sums_and_mins() {
        let comms = LocalComm::group(3);
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let r = comm.rank() as u64;
                    let mut counts = [r, 10 * r];
                    comm.all_reduce_u64(&mut counts, ReduceOp::Sum).unwrap();
                    let mut m = [r as f64 - 1.0];
                    comm.all_reduce_f64(&mut m, ReduceOp::Min).unwrap();
                    (counts, m[0])
                })
            })
            .collect();
        for h in handles {
            let (counts, min) = h.join().unwrap();
            assert_eq!(counts, [3, 30]);
            assert_eq!(min, -1.0);
        }
    }

    #[test]
    fn local_group_reports_length_mismatch_on_every_rank() {
        let comms = LocalComm::group(2);
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                thread::spawn(move || {
                    let mut v = vec![1u64; comm.rank() + 1];
                    comm.all_reduce_u64(&mut v, ReduceOp::Sum)
                })
            })
            .collect();
        for h in handles {
            assert!(matches!(
                h.join().unwrap(),
                Err(CommError::LengthMismatch { .. })
            ));
        }
    }

    #[test]
    fn single_member_group_is_identity() {
        let comm = LocalComm::group(1).pop().unwrap();
        let mut v = [2.5f64];
        comm.all_reduce_f64(&mut v, ReduceOp::Min).unwrap();
        assert_eq!(v, [2.5]);
        assert!(comm.is_master());
    }

    #[cfg(feature = "mpi-support")]
    #[test]
    fn mpi_sum_smoke_if_available() {
        let comm = MpiComm::new().expect("MPI initialization failed");
        let mut v = [1u64];
        comm.all_reduce_u64(&mut v, ReduceOp::Sum).unwrap();
        assert_eq!(v[0] as usize, comm.size());
    }
}
