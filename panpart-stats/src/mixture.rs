//! Finite mixture models fitted by expectation-maximization.
//!
//! [`fit`] estimates a K-component mixture over scalar observations in
//! `[0, 1]`. The component distribution is pluggable through
//! [`ComponentFamily`]; three families are provided:
//!
//! - [`BinomialFamily`] — occurrence counts out of a fixed number of trials
//! - [`GaussianFamily`] — normal components over the raw value
//! - [`BetaFamily`] — beta components fitted by weighted method of moments
//!
//! Initialization is deterministic: component means start at evenly spaced
//! positions over the *distinct* observed values, and mixing weights start
//! uniform. Identical input and configuration therefore always produce
//! bit-identical fits, with or without the `parallel` feature.
//!
//! Fitted components are returned sorted by ascending mean so that component
//! indices carry meaning independent of initialization order.

use core::fmt;

use panpart_core::{LogProb, PanError, Result, Summarizable};

use crate::descriptive::{distinct_sorted, weighted_mean, weighted_variance};
use crate::distribution::{beta_ln_pdf, binomial_ln_pmf, normal_ln_pdf};

/// Smallest mixing weight a component may carry before renormalization.
const MIN_WEIGHT: f64 = 1e-10;
/// Minimum total responsibility for a component to be re-estimated.
const MIN_RESPONSIBILITY: f64 = 1e-8;

/// A fitted mixture component.
pub trait Component: Clone + fmt::Debug + Send + Sync {
    /// Log-density of the component at `x`.
    fn ln_density(&self, x: f64) -> f64;

    /// Mean of the component on the observation scale.
    fn mean(&self) -> f64;
}

/// A parametric family of mixture components.
///
/// Implementations supply the initial component for a target mean and the
/// weighted M-step estimator.
pub trait ComponentFamily: Sync {
    /// The component type produced by this family.
    type Component: Component;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Component centered on `mean` with a scale hint `spread`.
    fn initial(&self, mean: f64, spread: f64) -> Self::Component;

    /// Weighted maximum-likelihood (or moment) estimate.
    ///
    /// Returns `None` when the weights carry no information, in which case
    /// the previous component is kept.
    fn estimate(&self, data: &[f64], weights: &[f64]) -> Option<Self::Component>;
}

// ── Binomial ───────────────────────────────────────────────────────────────

/// Binomial components over frequencies `k / trials`.
#[derive(Debug, Clone, Copy)]
pub struct BinomialFamily {
    /// Number of trials (genomes) each observation was drawn from.
    pub trials: usize,
    /// Success probabilities are kept inside `[floor, 1 - floor]`.
    pub floor: f64,
}

impl BinomialFamily {
    /// Family over `trials` trials with the default probability floor.
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            floor: 1e-6,
        }
    }

    fn clamp(&self, p: f64) -> f64 {
        p.clamp(self.floor, 1.0 - self.floor)
    }
}

/// A binomial component with success probability `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialComponent {
    pub p: f64,
    pub trials: usize,
}

impl Component for BinomialComponent {
    fn ln_density(&self, x: f64) -> f64 {
        let k = (x * self.trials as f64).round().max(0.0) as usize;
        binomial_ln_pmf(k.min(self.trials), self.trials, self.p)
    }

    fn mean(&self) -> f64 {
        self.p
    }
}

impl ComponentFamily for BinomialFamily {
    type Component = BinomialComponent;

    fn name(&self) -> &'static str {
        "binomial"
    }

    fn initial(&self, mean: f64, _spread: f64) -> BinomialComponent {
        BinomialComponent {
            p: self.clamp(mean),
            trials: self.trials,
        }
    }

    fn estimate(&self, data: &[f64], weights: &[f64]) -> Option<BinomialComponent> {
        let p = weighted_mean(data, weights)?;
        Some(BinomialComponent {
            p: self.clamp(p),
            trials: self.trials,
        })
    }
}

// ── Gaussian ───────────────────────────────────────────────────────────────

/// Normal components with a variance floor.
#[derive(Debug, Clone, Copy)]
pub struct GaussianFamily {
    /// Variances never drop below this value, so zero-variance clusters
    /// (all members at one frequency) stay finite.
    pub min_variance: f64,
}

impl Default for GaussianFamily {
    fn default() -> Self {
        Self { min_variance: 1e-4 }
    }
}

/// A normal component `N(mu, var)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianComponent {
    pub mu: f64,
    pub var: f64,
}

impl Component for GaussianComponent {
    fn ln_density(&self, x: f64) -> f64 {
        normal_ln_pdf(x, self.mu, self.var)
    }

    fn mean(&self) -> f64 {
        self.mu
    }
}

impl ComponentFamily for GaussianFamily {
    type Component = GaussianComponent;

    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn initial(&self, mean: f64, spread: f64) -> GaussianComponent {
        GaussianComponent {
            mu: mean,
            var: (spread * spread).max(self.min_variance),
        }
    }

    fn estimate(&self, data: &[f64], weights: &[f64]) -> Option<GaussianComponent> {
        let mu = weighted_mean(data, weights)?;
        let var = weighted_variance(data, weights, mu)?;
        Some(GaussianComponent {
            mu,
            var: var.max(self.min_variance),
        })
    }
}

// ── Beta ───────────────────────────────────────────────────────────────────

/// Beta components; observations are clamped into `[clamp, 1 - clamp]`.
#[derive(Debug, Clone, Copy)]
pub struct BetaFamily {
    pub clamp: f64,
    /// Upper bound on `alpha + beta`, reached by zero-variance clusters.
    pub max_concentration: f64,
}

impl Default for BetaFamily {
    fn default() -> Self {
        Self {
            clamp: 1e-3,
            max_concentration: 1e4,
        }
    }
}

impl BetaFamily {
    /// Family over frequencies out of `trials` genomes.
    ///
    /// Concentration is capped at `trials`: a cluster of identical
    /// frequencies is only known to the resolution `1 / trials`, so it
    /// should not collapse into a spike narrower than that.
    pub fn new(trials: usize) -> Self {
        Self {
            max_concentration: (trials as f64).max(2.0),
            ..Self::default()
        }
    }

    fn from_moments(&self, mean: f64, var: f64) -> BetaComponent {
        let m = mean.clamp(self.clamp, 1.0 - self.clamp);
        let concentration = if var > 0.0 {
            (m * (1.0 - m) / var - 1.0).clamp(1e-2, self.max_concentration)
        } else {
            self.max_concentration
        };
        BetaComponent {
            alpha: m * concentration,
            beta: (1.0 - m) * concentration,
            clamp: self.clamp,
        }
    }
}

/// A beta component `Beta(alpha, beta)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaComponent {
    pub alpha: f64,
    pub beta: f64,
    clamp: f64,
}

impl Component for BetaComponent {
    fn ln_density(&self, x: f64) -> f64 {
        beta_ln_pdf(x.clamp(self.clamp, 1.0 - self.clamp), self.alpha, self.beta)
    }

    fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}

impl ComponentFamily for BetaFamily {
    type Component = BetaComponent;

    fn name(&self) -> &'static str {
        "beta"
    }

    fn initial(&self, mean: f64, spread: f64) -> BetaComponent {
        self.from_moments(mean, spread * spread)
    }

    fn estimate(&self, data: &[f64], weights: &[f64]) -> Option<BetaComponent> {
        let clamped: Vec<f64> = data
            .iter()
            .map(|&x| x.clamp(self.clamp, 1.0 - self.clamp))
            .collect();
        let m = weighted_mean(&clamped, weights)?;
        let v = weighted_variance(&clamped, weights, m)?;
        Some(self.from_moments(m, v))
    }
}

// ── EM ─────────────────────────────────────────────────────────────────────

/// Stopping rules for [`fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureConfig {
    /// Number of components K (default: 3).
    pub n_components: usize,
    /// Stop when the log-likelihood improves by less than this (default: 1e-6).
    pub tolerance: f64,
    /// Hard cap on EM iterations (default: 500).
    pub max_iterations: usize,
}

impl Default for MixtureConfig {
    fn default() -> Self {
        Self {
            n_components: 3,
            tolerance: 1e-6,
            max_iterations: 500,
        }
    }
}

/// Result of an EM fit. Components are ordered by ascending mean.
#[derive(Debug, Clone)]
pub struct MixtureFit<C> {
    /// Fitted components, ascending by mean.
    pub components: Vec<C>,
    /// Mixing weights, aligned with `components`.
    pub weights: Vec<f64>,
    /// `responsibilities[i][j]`: posterior of component `j` for observation `i`.
    pub responsibilities: Vec<Vec<f64>>,
    /// Index of the highest-responsibility component per observation.
    pub assignments: Vec<usize>,
    /// Final total log-likelihood.
    pub log_likelihood: f64,
    /// Number of E-steps performed.
    pub iterations: usize,
    /// Whether the tolerance was reached before the iteration cap.
    pub converged: bool,
}

impl<C: Component> MixtureFit<C> {
    /// Component means, ascending.
    pub fn means(&self) -> Vec<f64> {
        self.components.iter().map(Component::mean).collect()
    }
}

impl<C: Component> Summarizable for MixtureFit<C> {
    fn summary(&self) -> String {
        let means: Vec<String> = self.means().iter().map(|m| format!("{:.3}", m)).collect();
        format!(
            "{} components (means {}), logL={:.4}, {} iterations{}",
            self.components.len(),
            means.join("/"),
            self.log_likelihood,
            self.iterations,
            if self.converged { "" } else { " (not converged)" },
        )
    }
}

/// Fit a `config.n_components`-component mixture to `data` by EM.
///
/// # Errors
///
/// - [`PanError::EmptyInput`] if `data` is empty.
/// - [`PanError::InvalidInput`] for a zero component count, non-positive
///   tolerance, zero iteration cap, or non-finite observations.
/// - [`PanError::DegenerateModel`] if `data` has fewer distinct values than
///   components.
///
/// Reaching the iteration cap is not an error; check [`MixtureFit::converged`].
pub fn fit<F: ComponentFamily>(
    family: &F,
    data: &[f64],
    config: &MixtureConfig,
) -> Result<MixtureFit<F::Component>> {
    if data.is_empty() {
        return Err(PanError::EmptyInput("mixture fit needs at least one observation".into()));
    }
    let k = config.n_components;
    if k == 0 {
        return Err(PanError::InvalidInput("n_components must be at least 1".into()));
    }
    if config.tolerance.is_nan() || config.tolerance <= 0.0 {
        return Err(PanError::InvalidInput(format!(
            "tolerance must be positive, got {}",
            config.tolerance
        )));
    }
    if config.max_iterations == 0 {
        return Err(PanError::InvalidInput("max_iterations must be at least 1".into()));
    }
    if let Some(bad) = data.iter().find(|x| !x.is_finite()) {
        return Err(PanError::InvalidInput(format!("non-finite observation {}", bad)));
    }

    let distinct = distinct_sorted(data);
    if distinct.len() < k {
        return Err(PanError::DegenerateModel {
            reason: format!(
                "{} distinct values cannot support {} components",
                distinct.len(),
                k
            ),
            resolution: "reduce n_components or supply fallback thresholds".into(),
        });
    }

    let mut components = initial_components(family, &distinct, k);
    let mut weights = vec![1.0 / k as f64; k];
    log::debug!(
        "EM start: {} {} components over {} observations ({} distinct)",
        k,
        family.name(),
        data.len(),
        distinct.len()
    );

    let mut prev_ll = f64::NEG_INFINITY;
    let mut prev_state: Option<(Vec<F::Component>, Vec<f64>, Vec<Vec<f64>>)> = None;
    let mut iterations = 0;
    let mut converged = false;
    let (mut responsibilities, mut log_likelihood);

    loop {
        iterations += 1;
        let (resp, ll) = e_step(data, &components, &weights);
        let improvement = ll - prev_ll;
        log::debug!("EM iteration {}: logL={:.6} (Δ={:.3e})", iterations, ll, improvement);

        // A moment-matching M-step may lower the likelihood; keep the best estimate.
        if improvement < 0.0 {
            if let Some((c, w, r)) = prev_state.take() {
                log::warn!(
                    "EM log-likelihood fell by {:.3e} at iteration {}; keeping iteration {}",
                    -improvement,
                    iterations,
                    iterations - 1
                );
                components = c;
                weights = w;
                responsibilities = r;
                log_likelihood = prev_ll;
                break;
            }
        }
        responsibilities = resp;
        log_likelihood = ll;

        if prev_ll.is_finite() && improvement < config.tolerance {
            converged = true;
            break;
        }
        if iterations >= config.max_iterations {
            break;
        }
        prev_ll = ll;
        prev_state = Some((components.clone(), weights.clone(), responsibilities.clone()));

        m_step(family, data, &responsibilities, &mut components, &mut weights);
    }

    Ok(order_by_mean(
        components,
        weights,
        responsibilities,
        log_likelihood,
        iterations,
        converged,
    ))
}

/// Place initial means at evenly spaced ranks of the distinct values.
fn initial_components<F: ComponentFamily>(
    family: &F,
    distinct: &[f64],
    k: usize,
) -> Vec<F::Component> {
    let d = distinct.len();
    let range = distinct[d - 1] - distinct[0];
    let spread = range / (2 * k) as f64;
    (0..k)
        .map(|j| {
            let idx = if k == 1 {
                d / 2
            } else {
                ((j * (d - 1)) as f64 / (k - 1) as f64).round() as usize
            };
            family.initial(distinct[idx], spread)
        })
        .collect()
}

/// Posterior responsibilities and the log-likelihood contribution of `x`.
fn e_step_row<C: Component>(x: f64, components: &[C], ln_weights: &[f64]) -> (Vec<f64>, f64) {
    let terms: Vec<f64> = components
        .iter()
        .zip(ln_weights)
        .map(|(c, &lw)| lw + c.ln_density(x))
        .collect();
    let total = LogProb::sum(&terms).0;
    if !total.is_finite() {
        let k = components.len();
        return (vec![1.0 / k as f64; k], total);
    }
    let resp = terms.iter().map(|&t| LogProb(t - total).to_prob()).collect();
    (resp, total)
}

fn e_step<C: Component>(data: &[f64], components: &[C], weights: &[f64]) -> (Vec<Vec<f64>>, f64) {
    let ln_weights: Vec<f64> = weights.iter().map(|w| w.ln()).collect();

    #[cfg(feature = "parallel")]
    let rows: Vec<(Vec<f64>, f64)> = {
        use rayon::prelude::*;
        data.par_iter()
            .map(|&x| e_step_row(x, components, &ln_weights))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<(Vec<f64>, f64)> = data
        .iter()
        .map(|&x| e_step_row(x, components, &ln_weights))
        .collect();

    // Summed in observation order so parallel and serial runs agree bit for bit.
    let mut ll = 0.0;
    let mut resp = Vec::with_capacity(rows.len());
    for (r, l) in rows {
        ll += l;
        resp.push(r);
    }
    (resp, ll)
}

fn m_step<F: ComponentFamily>(
    family: &F,
    data: &[f64],
    responsibilities: &[Vec<f64>],
    components: &mut [F::Component],
    weights: &mut [f64],
) {
    let n = data.len() as f64;
    for j in 0..components.len() {
        let col: Vec<f64> = responsibilities.iter().map(|r| r[j]).collect();
        let nk: f64 = col.iter().sum();
        weights[j] = (nk / n).max(MIN_WEIGHT);
        if nk > MIN_RESPONSIBILITY {
            if let Some(c) = family.estimate(data, &col) {
                components[j] = c;
            }
        }
    }
    let total: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= total;
    }
}

fn order_by_mean<C: Component>(
    components: Vec<C>,
    weights: Vec<f64>,
    responsibilities: Vec<Vec<f64>>,
    log_likelihood: f64,
    iterations: usize,
    converged: bool,
) -> MixtureFit<C> {
    let mut order: Vec<usize> = (0..components.len()).collect();
    // Stable: equal means keep their initialization order.
    order.sort_by(|&a, &b| components[a].mean().total_cmp(&components[b].mean()));

    let components: Vec<C> = order.iter().map(|&j| components[j].clone()).collect();
    let weights: Vec<f64> = order.iter().map(|&j| weights[j]).collect();
    let responsibilities: Vec<Vec<f64>> = responsibilities
        .into_iter()
        .map(|row| order.iter().map(|&j| row[j]).collect())
        .collect();
    let assignments = responsibilities.iter().map(|row| argmax(row)).collect();

    MixtureFit {
        components,
        weights,
        responsibilities,
        assignments,
        log_likelihood,
        iterations,
        converged,
    }
}

/// Index of the largest value; ties resolve to the lowest index.
fn argmax(row: &[f64]) -> usize {
    let mut best = 0;
    for (j, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = j;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frequencies out of 20 trials: a rare block, a middle block, a core block.
    fn three_blocks() -> Vec<f64> {
        let mut data = Vec::new();
        for k in [1usize, 1, 2, 1, 2, 1, 1, 2, 1, 1] {
            data.push(k as f64 / 20.0);
        }
        for k in [9usize, 10, 11, 10, 9, 10] {
            data.push(k as f64 / 20.0);
        }
        for k in [20usize, 20, 19, 20, 20, 20, 19, 20, 20, 20, 20, 20] {
            data.push(k as f64 / 20.0);
        }
        data
    }

    #[test]
    fn binomial_separates_blocks() {
        let data = three_blocks();
        let fit = fit(&BinomialFamily::new(20), &data, &MixtureConfig::default()).unwrap();
        assert!(fit.converged);
        let means = fit.means();
        assert!(means[0] < 0.15, "low mean {}", means[0]);
        assert!((means[1] - 0.5).abs() < 0.1, "mid mean {}", means[1]);
        assert!(means[2] > 0.9, "high mean {}", means[2]);
        assert_eq!(fit.assignments[0], 0);
        assert_eq!(fit.assignments[12], 1);
        assert_eq!(fit.assignments[data.len() - 1], 2);
    }

    #[test]
    fn gaussian_separates_blocks() {
        let data = three_blocks();
        let fit = fit(&GaussianFamily::default(), &data, &MixtureConfig::default()).unwrap();
        let means = fit.means();
        assert!(means[0] < means[1] && means[1] < means[2]);
        assert_eq!(fit.assignments[0], 0);
        assert_eq!(fit.assignments[data.len() - 1], 2);
    }

    #[test]
    fn beta_separates_blocks() {
        let data = three_blocks();
        let fit = fit(&BetaFamily::default(), &data, &MixtureConfig::default()).unwrap();
        let means = fit.means();
        assert!(means[0] < means[1] && means[1] < means[2]);
        assert_eq!(fit.assignments[0], 0);
        assert_eq!(fit.assignments[data.len() - 1], 2);
    }

    #[test]
    fn responsibilities_are_distributions() {
        let data = three_blocks();
        let fit = fit(&BinomialFamily::new(20), &data, &MixtureConfig::default()).unwrap();
        for row in &fit.responsibilities {
            let s: f64 = row.iter().sum();
            assert!((s - 1.0).abs() < 1e-9);
        }
        let w: f64 = fit.weights.iter().sum();
        assert!((w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic() {
        let data = three_blocks();
        let a = fit(&BinomialFamily::new(20), &data, &MixtureConfig::default()).unwrap();
        let b = fit(&BinomialFamily::new(20), &data, &MixtureConfig::default()).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.responsibilities, b.responsibilities);
        assert_eq!(a.log_likelihood.to_bits(), b.log_likelihood.to_bits());
    }

    #[test]
    fn iteration_cap_is_reported() {
        let data = three_blocks();
        let config = MixtureConfig {
            max_iterations: 1,
            ..MixtureConfig::default()
        };
        let fit = fit(&BinomialFamily::new(20), &data, &config).unwrap();
        assert!(!fit.converged);
        assert_eq!(fit.iterations, 1);
        assert_eq!(fit.assignments.len(), data.len());
    }

    /// Log-likelihoods of fits capped at 1, 2, .. `max_cap` iterations.
    fn capped_log_likelihoods<F: ComponentFamily>(family: &F, data: &[f64], max_cap: usize) -> Vec<f64> {
        (1..=max_cap)
            .map(|cap| {
                let config = MixtureConfig {
                    max_iterations: cap,
                    tolerance: 1e-300,
                    ..MixtureConfig::default()
                };
                fit(family, data, &config).unwrap().log_likelihood
            })
            .collect()
    }

    fn assert_non_decreasing(lls: &[f64], family: &str) {
        for (i, w) in lls.windows(2).enumerate() {
            assert!(w[1] >= w[0] - 1e-9, "{}: logL fell from {} to {} at cap {}", family, w[0], w[1], i + 2);
        }
    }

    /// Frequencies out of 14 genomes on which beta moment matching overshoots.
    fn sparse_fourteen() -> Vec<f64> {
        [1usize, 1, 1, 12, 5, 1, 4, 14].iter().map(|&k| k as f64 / 14.0).collect()
    }

    #[test]
    fn log_likelihood_never_decreases() {
        let data = three_blocks();
        assert_non_decreasing(&capped_log_likelihoods(&BinomialFamily::new(20), &data, 30), "binomial");
        assert_non_decreasing(&capped_log_likelihoods(&GaussianFamily::default(), &data, 30), "gaussian");
        assert_non_decreasing(&capped_log_likelihoods(&BetaFamily::default(), &data, 30), "beta");

        let sparse = sparse_fourteen();
        assert_non_decreasing(&capped_log_likelihoods(&BinomialFamily::new(14), &sparse, 30), "binomial");
        assert_non_decreasing(&capped_log_likelihoods(&GaussianFamily::default(), &sparse, 30), "gaussian");
        assert_non_decreasing(&capped_log_likelihoods(&BetaFamily::default(), &sparse, 30), "beta");
        assert_non_decreasing(&capped_log_likelihoods(&BetaFamily::new(14), &sparse, 30), "beta/14");
    }

    #[test]
    fn likelihood_drop_keeps_previous_estimate() {
        let data = sparse_fourteen();
        let family = BetaFamily::default();
        let full = fit(&family, &data, &MixtureConfig::default()).unwrap();
        let best = capped_log_likelihoods(&family, &data, full.iterations)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(full.log_likelihood >= best - 1e-9, "{} < {}", full.log_likelihood, best);
        assert!(full.log_likelihood > 8.3);
        assert!(!full.converged);
    }

    #[test]
    fn beta_concentration_follows_resolution() {
        let family = BetaFamily::new(14);
        assert_eq!(family.max_concentration, 14.0);
        let spike = family.from_moments(0.857, 0.0);
        assert!((spike.alpha + spike.beta - 14.0).abs() < 1e-9);
        assert_eq!(BetaFamily::new(1).max_concentration, 2.0);
    }

    #[test]
    fn empty_input() {
        let err = fit(&BinomialFamily::new(5), &[], &MixtureConfig::default()).unwrap_err();
        assert!(matches!(err, PanError::EmptyInput(_)));
    }

    #[test]
    fn too_few_distinct_values() {
        let err = fit(&BinomialFamily::new(5), &[1.0, 1.0, 0.2], &MixtureConfig::default())
            .unwrap_err();
        assert!(matches!(err, PanError::DegenerateModel { .. }));
    }

    #[test]
    fn invalid_config() {
        let data = [0.1, 0.5, 0.9];
        let bad_tol = MixtureConfig {
            tolerance: 0.0,
            ..MixtureConfig::default()
        };
        assert!(fit(&BinomialFamily::new(10), &data, &bad_tol).is_err());
        let bad_k = MixtureConfig {
            n_components: 0,
            ..MixtureConfig::default()
        };
        assert!(fit(&BinomialFamily::new(10), &data, &bad_k).is_err());
        assert!(fit(&BinomialFamily::new(10), &[0.1, f64::NAN, 0.9], &MixtureConfig::default()).is_err());
    }

    #[test]
    fn argmax_ties_take_lowest() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0]), 0);
        assert_eq!(argmax(&[0.1, 0.3, 0.6]), 2);
    }

    #[test]
    fn summary_mentions_components() {
        let data = three_blocks();
        let fit = fit(&BinomialFamily::new(20), &data, &MixtureConfig::default()).unwrap();
        assert!(fit.summary().starts_with("3 components"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn check_family<F: ComponentFamily>(family: &F, data: &[f64]) -> std::result::Result<(), TestCaseError> {
        let a = fit(family, data, &MixtureConfig::default()).unwrap();
        let b = fit(family, data, &MixtureConfig::default()).unwrap();
        let means = a.means();
        prop_assert!(means.windows(2).all(|w| w[0] <= w[1]), "{}: {:?}", family.name(), means);
        prop_assert_eq!(&a.assignments, &b.assignments);
        prop_assert_eq!(a.log_likelihood.to_bits(), b.log_likelihood.to_bits());

        let one_step = MixtureConfig {
            max_iterations: 1,
            ..MixtureConfig::default()
        };
        let start = fit(family, data, &one_step).unwrap();
        prop_assert!(a.log_likelihood >= start.log_likelihood - 1e-9, "{}", family.name());
        Ok(())
    }

    proptest! {
        #[test]
        fn components_sorted_and_fit_repeatable(
            counts in proptest::collection::vec(0usize..=12, 3..60)
        ) {
            let data: Vec<f64> = counts.iter().map(|&k| k as f64 / 12.0).collect();
            prop_assume!(distinct_sorted(&data).len() >= 3);
            check_family(&BinomialFamily::new(12), &data)?;
            check_family(&GaussianFamily::default(), &data)?;
            check_family(&BetaFamily::new(12), &data)?;
        }
    }
}
