//! Log-space probability type for numerically stable likelihood sums.
//!
//! Mixture responsibilities add per-component densities that are often far
//! below `f64::MIN_POSITIVE`; [`LogProb`] keeps that sum in log space.

/// A probability (or unnormalised density) stored as its natural logarithm.
///
/// Negative infinity represents impossibility. Values above zero are allowed
/// so that continuous densities greater than one can be carried as well.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LogProb(pub f64);

impl LogProb {
    /// Convert back to linear space.
    pub fn to_prob(self) -> f64 {
        self.0.exp()
    }

    /// Impossible event: `ln(0) = -∞`.
    pub const fn impossible() -> Self {
        Self(f64::NEG_INFINITY)
    }

    /// Sum a sequence of log values, `ln Σ exp(xᵢ)`.
    ///
    /// Uses the max-shift form so that a single pass is exact even when
    /// every term is far below `f64::MIN_POSITIVE` in linear space.
    pub fn sum(values: &[f64]) -> Self {
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return Self::impossible();
        }
        if max == f64::INFINITY {
            return Self(f64::INFINITY);
        }
        let acc: f64 = values.iter().map(|&v| (v - max).exp()).sum();
        Self(max + acc.ln())
    }
}
