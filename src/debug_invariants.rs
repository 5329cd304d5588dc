//! Opt-in structural checks for mesh containers.
//!
//! Checks run under `debug_assertions` or when the `strict-invariants` /
//! `check-invariants` features are enabled; release builds skip them.

use crate::mesh_error::MeshCheckError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshCheckError>;

    /// Panic on the first violated invariant when checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "structural check failed");
    }
}

/// Run a fallible check and panic on error when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
