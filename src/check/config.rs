//! Thresholds and binning for the face non-orthogonality check.

use crate::geometry::orthogonality::{
    DEFAULT_DEGENERATE_GUARD, DEFAULT_STABILIZER, FaceClassifier,
};
use crate::mesh_error::MeshCheckError;
use serde::{Deserialize, Serialize};

/// Options for [`OrthogonalityChecker`](super::OrthogonalityChecker).
///
/// Missing fields take their default when deserialized, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthogonalityConfig {
    /// Faces whose non-orthogonality angle exceeds this many degrees are
    /// reported as severe.
    pub severe_threshold_deg: f64,
    /// Number of histogram bins, starting at 0 degrees.
    pub n_bins: usize,
    /// Width of each histogram bin in degrees.
    pub bin_width_deg: f64,
    /// A face past the threshold whose metric does not exceed this value is
    /// an error rather than a severe face.
    pub degenerate_guard: f64,
    /// Added to the denominator of the metric to keep zero-length vectors
    /// finite.
    pub stabilizer: f64,
}

impl Default for OrthogonalityConfig {
    fn default() -> Self {
        Self {
            severe_threshold_deg: 70.0,
            n_bins: 9,
            bin_width_deg: 10.0,
            degenerate_guard: DEFAULT_DEGENERATE_GUARD,
            stabilizer: DEFAULT_STABILIZER,
        }
    }
}

impl OrthogonalityConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), MeshCheckError> {
        let finite = [
            ("severe_threshold_deg", self.severe_threshold_deg),
            ("bin_width_deg", self.bin_width_deg),
            ("degenerate_guard", self.degenerate_guard),
            ("stabilizer", self.stabilizer),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{name} must be finite, got {value}")));
        }
        if self.n_bins == 0 {
            return Err(invalid("n_bins must be at least 1"));
        }
        if self.bin_width_deg <= 0.0 {
            return Err(invalid(format!(
                "bin_width_deg must be positive, got {}",
                self.bin_width_deg
            )));
        }
        let span = self.n_bins as f64 * self.bin_width_deg;
        if span > 180.0 {
            return Err(invalid(format!(
                "{} bins of {} degrees span {span} degrees, more than 180",
                self.n_bins, self.bin_width_deg
            )));
        }
        // at or past 90 degrees the error class can no longer be reached
        if self.severe_threshold_deg <= 0.0 || self.severe_threshold_deg >= 90.0 {
            return Err(invalid(format!(
                "severe_threshold_deg must lie in (0, 90), got {}",
                self.severe_threshold_deg
            )));
        }
        if self.degenerate_guard < 0.0 {
            return Err(invalid(format!(
                "degenerate_guard must not be negative, got {}",
                self.degenerate_guard
            )));
        }
        let severe_cos = self.severe_threshold_deg.to_radians().cos();
        if self.degenerate_guard >= severe_cos {
            return Err(invalid(format!(
                "degenerate_guard {} must be below cos(severe_threshold_deg) = {severe_cos}",
                self.degenerate_guard
            )));
        }
        if self.stabilizer <= 0.0 {
            return Err(invalid(format!(
                "stabilizer must be positive, got {}",
                self.stabilizer
            )));
        }
        Ok(())
    }

    /// Per-face classifier built from these options. Does not validate.
    pub fn classifier(&self) -> FaceClassifier {
        FaceClassifier::new(
            self.severe_threshold_deg,
            self.n_bins,
            self.bin_width_deg,
            self.degenerate_guard,
            self.stabilizer,
        )
    }
}

fn invalid(message: impl Into<String>) -> MeshCheckError {
    MeshCheckError::InvalidConfig(message.into())
}
