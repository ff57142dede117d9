//! Log-density helpers for the mixture component families.
//!
//! Everything here works in natural-log space: the EM loop only ever adds
//! log-densities and never needs a linear-space pdf.

use core::f64::consts::PI;

/// Natural log of the gamma function via the Lanczos approximation (g=7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection formula: Γ(x) = π / (sin(πx) · Γ(1-x))
        let log_pi_over_sin = (PI / (PI * x).sin()).ln();
        log_pi_over_sin - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = 0.99999999999980993_f64;
        for (i, &c) in COEFFS.iter().enumerate() {
            ag += c / (x + i as f64 + 1.0);
        }
        let t = x + 7.5; // g + 0.5
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// `ln C(n, k)`; negative infinity when `k > n`.
pub fn ln_choose(n: usize, k: usize) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `ln B(a, b)` for positive shape parameters.
pub fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

/// Binomial log-pmf `ln P(X = k | n, p)`.
///
/// Handles the `p ∈ {0, 1}` boundaries exactly so that a certain outcome
/// scores `0.0` rather than `NaN`.
pub fn binomial_ln_pmf(k: usize, n: usize, p: f64) -> f64 {
    if k > n || !(0.0..=1.0).contains(&p) {
        return f64::NEG_INFINITY;
    }
    let success = if k == 0 { 0.0 } else { k as f64 * p.ln() };
    let failure = if k == n { 0.0 } else { (n - k) as f64 * (1.0 - p).ln() };
    ln_choose(n, k) + success + failure
}

/// Normal log-density with mean `mu` and variance `var` (must be positive).
pub fn normal_ln_pdf(x: f64, mu: f64, var: f64) -> f64 {
    let d = x - mu;
    -0.5 * ((2.0 * PI * var).ln() + d * d / var)
}

/// Beta log-density for `x ∈ (0, 1)` and positive shapes.
pub fn beta_ln_pdf(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 || x >= 1.0 {
        return f64::NEG_INFINITY;
    }
    (a - 1.0) * x.ln() + (b - 1.0) * (1.0 - x).ln() - ln_beta(a, b)
}
