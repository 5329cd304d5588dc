//! Globally reduced result of a non-orthogonality check and its text form.

use super::config::OrthogonalityConfig;
use crate::geometry::orthogonality::{LocalOrthogonalityStats, metric_to_angle_deg};
use serde::Serialize;
use std::fmt;

/// One histogram row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Lower edge of the bin in degrees.
    pub angle_deg: f64,
    pub count: u64,
}

/// Aggregates over every internal face of every partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrthogonalityReport {
    pub bins: Vec<HistogramBin>,
    pub n_faces: u64,
    /// Smallest metric seen; `+inf` when there are no faces.
    pub min_metric: f64,
    pub sum_metric: f64,
    pub n_severe: u64,
    pub n_errors: u64,
    pub severe_threshold_deg: f64,
    pub bin_width_deg: f64,
}

impl OrthogonalityReport {
    /// Build from reduced aggregates.
    pub fn from_stats(stats: &LocalOrthogonalityStats, config: &OrthogonalityConfig) -> Self {
        let bins = stats
            .bins
            .iter()
            .enumerate()
            .map(|(k, &count)| HistogramBin {
                angle_deg: k as f64 * config.bin_width_deg,
                count,
            })
            .collect();
        Self {
            bins,
            n_faces: stats.n_faces,
            min_metric: stats.min_metric,
            sum_metric: stats.sum_metric,
            n_severe: stats.n_severe,
            n_errors: stats.n_errors,
            severe_threshold_deg: config.severe_threshold_deg,
            bin_width_deg: config.bin_width_deg,
        }
    }

    /// Largest non-orthogonality angle in degrees.
    pub fn max_angle_deg(&self) -> Option<f64> {
        (self.n_faces > 0).then(|| metric_to_angle_deg(self.min_metric))
    }

    /// Angle of the mean metric in degrees.
    pub fn average_angle_deg(&self) -> Option<f64> {
        (self.n_faces > 0).then(|| metric_to_angle_deg(self.sum_metric / self.n_faces as f64))
    }

    /// Share of all faces that fell into bin `k`, in percent. Zero without faces.
    pub fn percent(&self, k: usize) -> f64 {
        if self.n_faces == 0 {
            return 0.0;
        }
        self.bins[k].count as f64 / self.n_faces as f64 * 100.0
    }

    pub fn n_binned(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// `true` when at least one face failed the check.
    pub fn has_errors(&self) -> bool {
        self.n_errors > 0
    }
}

/// Format like C's `%g` with six significant digits.
pub(crate) fn general(value: f64) -> String {
    const DIGITS: i32 = 6;
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let prec = (DIGITS - 1) as usize;
    let scientific = format!("{value:.prec$e}");
    let rounded: f64 = scientific.parse().unwrap_or(value);
    let exp = rounded.abs().log10().floor() as i32;
    if !(-5..DIGITS).contains(&exp) {
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    } else {
        let decimals = (DIGITS - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl fmt::Display for OrthogonalityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "    Mesh non-orthogonality distribution. Binwidth = {} degrees.",
            general(self.bin_width_deg)
        )?;
        writeln!(
            f,
            "        {:>10}{:>15}{:>10}",
            "Angle", "Number faces", "Percent faces"
        )?;
        for (k, bin) in self.bins.iter().enumerate() {
            writeln!(
                f,
                "        {:>10}{:>15}{:>10}",
                general(bin.angle_deg),
                bin.count,
                general(self.percent(k))
            )?;
        }
        writeln!(f, "    Number of internal faces: {}", self.n_faces)?;

        if let (Some(max), Some(avg)) = (self.max_angle_deg(), self.average_angle_deg()) {
            writeln!(
                f,
                "    Mesh non-orthogonality Max: {} average: {}",
                general(max),
                general(avg)
            )?;
        }
        if self.n_severe > 0 {
            writeln!(
                f,
                "   *Number of severely non-orthogonal faces above threshold ({} deg): {}.",
                general(self.severe_threshold_deg),
                self.n_severe
            )?;
        }
        if self.has_errors() {
            writeln!(
                f,
                " ***Non-orthogality errors present. This happens as non-orthogonality approaches 90 degrees."
            )?;
            writeln!(
                f,
                " ***Number of non-orthogonality errors: {}.",
                self.n_errors
            )
        } else {
            writeln!(f, "    Non-orthogonality check OK. No errors detected.")
        }
    }
}
