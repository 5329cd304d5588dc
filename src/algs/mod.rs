//! Re-export public algorithms.

pub mod communicator;
pub mod decompose;
pub mod meshgen;
pub mod reduction;

pub use communicator::{Communicator, LocalComm, NoComm, ReduceOp};
pub use decompose::{Partition, decompose_by_owner, decompose_faces};
pub use reduction::{all_reduce_stats, reduce_partitions};
