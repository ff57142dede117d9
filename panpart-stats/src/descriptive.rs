//! Descriptive statistics for numeric data.
//!
//! Plain and weighted moments and the distinct-value helper used to seed and
//! re-estimate mixture components.

use panpart_core::{PanError, Result};

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(PanError::InvalidInput(
            "mean: data must not be empty".into(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sorted distinct values of `data` (exact float equality).
pub fn distinct_sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
    sorted
}

/// Weighted mean `Σ wᵢxᵢ / Σ wᵢ`, or `None` when the total weight is not positive.
pub fn weighted_mean(data: &[f64], weights: &[f64]) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let s: f64 = data.iter().zip(weights).map(|(&x, &w)| w * x).sum();
    Some(s / total)
}

/// Weighted population variance around `center`, or `None` when the total
/// weight is not positive.
pub fn weighted_variance(data: &[f64], weights: &[f64], center: f64) -> Option<f64> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let ss: f64 = data
        .iter()
        .zip(weights)
        .map(|(&x, &w)| w * (x - center).powi(2))
        .sum();
    Some(ss / total)
}
