//! Persistent / shell / cloud partitioning of gene families.
//!
//! [`PartitionModel`] fits a K-component mixture over the family frequencies of
//! an [`OccurrenceMatrix`] and labels every family by its most responsible
//! component. Components are ordered by mean frequency: the lowest maps to
//! [`PartitionLabel::Cloud`], the highest to [`PartitionLabel::Persistent`],
//! and everything in between to [`PartitionLabel::Shell`].
//!
//! When the data hold fewer distinct frequencies than components, the model
//! switches to fixed frequency cutoffs ([`FallbackThresholds`]) if configured,
//! otherwise it merges the surplus components and fits with fewer.

use core::fmt;

use panpart_core::{PanError, Result, Summarizable};
use panpart_stats::descriptive::{distinct_sorted, mean};
use panpart_stats::mixture::{self, Component, ComponentFamily, MixtureConfig, MixtureFit};
use panpart_stats::{BetaFamily, BinomialFamily, GaussianFamily};

use crate::config::{ComponentModel, FallbackThresholds, PartitionConfig};
use crate::family::FamilyId;
use crate::occurrence::OccurrenceMatrix;

/// Conservation class of a gene family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartitionLabel {
    Persistent,
    Shell,
    Cloud,
}

impl PartitionLabel {
    /// All labels, most to least conserved.
    pub const ALL: [PartitionLabel; 3] = [
        PartitionLabel::Persistent,
        PartitionLabel::Shell,
        PartitionLabel::Cloud,
    ];

    /// Label of component `index` among `k` components sorted by mean.
    fn for_component(index: usize, k: usize) -> Self {
        if index == 0 {
            PartitionLabel::Cloud
        } else if index + 1 == k {
            PartitionLabel::Persistent
        } else {
            PartitionLabel::Shell
        }
    }
}

impl fmt::Display for PartitionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionLabel::Persistent => write!(f, "persistent"),
            PartitionLabel::Shell => write!(f, "shell"),
            PartitionLabel::Cloud => write!(f, "cloud"),
        }
    }
}

/// Posterior probability of each class; the three values sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassPosterior {
    pub persistent: f64,
    pub shell: f64,
    pub cloud: f64,
}

impl ClassPosterior {
    /// Certainty for a single class.
    pub fn certain(label: PartitionLabel) -> Self {
        let mut posterior = Self::default();
        *posterior.slot(label) = 1.0;
        posterior
    }

    pub fn get(&self, label: PartitionLabel) -> f64 {
        match label {
            PartitionLabel::Persistent => self.persistent,
            PartitionLabel::Shell => self.shell,
            PartitionLabel::Cloud => self.cloud,
        }
    }

    fn slot(&mut self, label: PartitionLabel) -> &mut f64 {
        match label {
            PartitionLabel::Persistent => &mut self.persistent,
            PartitionLabel::Shell => &mut self.shell,
            PartitionLabel::Cloud => &mut self.cloud,
        }
    }
}

/// Partition outcome for one family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FamilyPartition {
    pub family: FamilyId,
    pub name: String,
    pub frequency: f64,
    pub label: PartitionLabel,
    /// Class posterior, summed over the components mapped to each class.
    pub posterior: ClassPosterior,
    /// Per-component responsibilities, components ascending by mean.
    /// Empty under threshold partitioning.
    pub responsibilities: Vec<f64>,
}

/// How the labels were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartitionMethod {
    /// EM mixture with this many components (possibly fewer than configured).
    Mixture { n_components: usize },
    /// Fixed frequency cutoffs.
    Thresholds,
}

/// EM stopped at the iteration cap. The partition is still usable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NonConvergenceWarning {
    pub iterations: usize,
    pub log_likelihood: f64,
}

impl fmt::Display for NonConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EM did not converge within {} iterations (logL={:.6})",
            self.iterations, self.log_likelihood
        )
    }
}

/// Labels for every family of an occurrence matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionResult {
    /// One entry per matrix row, ascending by family name.
    pub families: Vec<FamilyPartition>,
    pub method: PartitionMethod,
    /// Final log-likelihood; `None` under threshold partitioning.
    pub log_likelihood: Option<f64>,
    /// EM iterations performed (0 for thresholds).
    pub iterations: usize,
    pub warning: Option<NonConvergenceWarning>,
    /// Fitted component means, ascending. Empty for thresholds.
    pub component_means: Vec<f64>,
}

impl PartitionResult {
    /// Whether EM stopped on the tolerance (always true for thresholds).
    pub fn converged(&self) -> bool {
        self.warning.is_none()
    }

    /// Partition entry of a family by name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family was not partitioned.
    pub fn get(&self, family: &str) -> Result<&FamilyPartition> {
        self.families
            .binary_search_by(|p| p.name.as_str().cmp(family))
            .map(|i| &self.families[i])
            .map_err(|_| PanError::UnknownFamily(family.to_string()))
    }

    /// Label of a family by name.
    pub fn label(&self, family: &str) -> Result<PartitionLabel> {
        self.get(family).map(|p| p.label)
    }

    /// Number of families carrying `label`.
    pub fn count(&self, label: PartitionLabel) -> usize {
        self.families.iter().filter(|p| p.label == label).count()
    }

    /// Mean frequency of the families carrying `label`, `None` if there are none.
    pub fn mean_frequency(&self, label: PartitionLabel) -> Option<f64> {
        let freqs: Vec<f64> = self
            .families
            .iter()
            .filter(|p| p.label == label)
            .map(|p| p.frequency)
            .collect();
        mean(&freqs).ok()
    }
}

impl Summarizable for PartitionResult {
    fn summary(&self) -> String {
        let method = match self.method {
            PartitionMethod::Mixture { n_components } => {
                format!("{}-component mixture", n_components)
            }
            PartitionMethod::Thresholds => "thresholds".to_string(),
        };
        format!(
            "{} persistent, {} shell, {} cloud ({}{})",
            self.count(PartitionLabel::Persistent),
            self.count(PartitionLabel::Shell),
            self.count(PartitionLabel::Cloud),
            method,
            if self.converged() { "" } else { ", not converged" }
        )
    }
}

/// Mixture-based family partitioner.
#[derive(Debug, Clone)]
pub struct PartitionModel {
    config: PartitionConfig,
}

impl PartitionModel {
    /// # Errors
    ///
    /// Returns [`PanError::InvalidInput`] for an out-of-range configuration.
    pub fn new(config: PartitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Label every family of `matrix`.
    ///
    /// The result is a pure function of the matrix and the configuration:
    /// identical inputs give bit-identical labels and posteriors.
    ///
    /// # Errors
    ///
    /// - [`PanError::EmptyInput`] if the matrix has no families.
    /// - [`PanError::DegenerateModel`] if there are fewer than two distinct
    ///   frequencies and no fallback thresholds are configured.
    pub fn fit(&self, matrix: &OccurrenceMatrix) -> Result<PartitionResult> {
        if matrix.is_empty() {
            return Err(PanError::EmptyInput(
                "occurrence matrix has no gene families to partition".into(),
            ));
        }
        let frequencies = matrix.frequencies();
        let distinct = distinct_sorted(&frequencies).len();
        let mut k = self.config.n_components;

        if distinct < k {
            if let Some(thresholds) = self.config.fallback {
                log::warn!(
                    "{} distinct frequencies for {} components; partitioning by thresholds \
                     (persistent >= {}, cloud < {})",
                    distinct,
                    k,
                    thresholds.persistent_min,
                    thresholds.cloud_max
                );
                return Ok(partition_by_thresholds(matrix, &thresholds));
            }
            if distinct < 2 {
                return Err(PanError::DegenerateModel {
                    reason: format!(
                        "{} distinct family frequencies cannot support a {}-way partition",
                        distinct, k
                    ),
                    resolution: "set PartitionConfig::fallback to threshold-based labelling"
                        .into(),
                });
            }
            log::warn!(
                "{} distinct frequencies for {} components; merging down to {} components",
                distinct,
                k,
                distinct
            );
            k = distinct;
        }

        let em = MixtureConfig {
            n_components: k,
            tolerance: self.config.tolerance,
            max_iterations: self.config.max_iterations,
        };
        let result = match self.config.model {
            ComponentModel::Binomial => {
                run_mixture(&BinomialFamily::new(matrix.n_genomes()), matrix, &frequencies, &em)
            }
            ComponentModel::Gaussian => {
                run_mixture(&GaussianFamily::default(), matrix, &frequencies, &em)
            }
            ComponentModel::Beta => {
                run_mixture(&BetaFamily::new(matrix.n_genomes()), matrix, &frequencies, &em)
            }
        }?;

        if let Some(warning) = &result.warning {
            log::warn!("{}", warning);
        }
        log::info!("partitioned {} families: {}", matrix.n_families(), result.summary());
        Ok(result)
    }
}

fn run_mixture<F: ComponentFamily>(
    family: &F,
    matrix: &OccurrenceMatrix,
    frequencies: &[f64],
    config: &MixtureConfig,
) -> Result<PartitionResult> {
    let fit = mixture::fit(family, frequencies, config)?;
    Ok(label_from_fit(matrix, fit))
}

fn label_from_fit<C: Component>(matrix: &OccurrenceMatrix, fit: MixtureFit<C>) -> PartitionResult {
    let k = fit.components.len();
    let component_means = fit.means();
    let mut families: Vec<FamilyPartition> = matrix
        .rows()
        .iter()
        .zip(fit.responsibilities)
        .zip(&fit.assignments)
        .map(|((row, responsibilities), &best)| {
            let mut posterior = ClassPosterior::default();
            for (j, r) in responsibilities.iter().enumerate() {
                *posterior.slot(PartitionLabel::for_component(j, k)) += r;
            }
            FamilyPartition {
                family: row.family(),
                name: row.name().to_string(),
                frequency: row.frequency(),
                label: PartitionLabel::for_component(best, k),
                posterior,
                responsibilities,
            }
        })
        .collect();
    enforce_frequency_order(&mut families);

    let warning = (!fit.converged).then_some(NonConvergenceWarning {
        iterations: fit.iterations,
        log_likelihood: fit.log_likelihood,
    });
    PartitionResult {
        families,
        method: PartitionMethod::Mixture { n_components: k },
        log_likelihood: Some(fit.log_likelihood),
        iterations: fit.iterations,
        warning,
        component_means,
    }
}

/// Promote labels so that no family is less conserved than a family with a
/// lower frequency. Posteriors are left as fitted.
fn enforce_frequency_order(families: &mut [FamilyPartition]) {
    let mut order: Vec<usize> = (0..families.len()).collect();
    order.sort_by(|&a, &b| families[a].frequency.total_cmp(&families[b].frequency));

    let mut floor = PartitionLabel::Cloud;
    for i in order {
        let fam = &mut families[i];
        // `Ord` runs from most to least conserved.
        if fam.label > floor {
            log::debug!("{} ({:.3}) promoted from {} to {}", fam.name, fam.frequency, fam.label, floor);
            fam.label = floor;
        }
        floor = fam.label;
    }
}

fn partition_by_thresholds(
    matrix: &OccurrenceMatrix,
    thresholds: &FallbackThresholds,
) -> PartitionResult {
    let families = matrix
        .rows()
        .iter()
        .map(|row| {
            let f = row.frequency();
            let label = if f >= thresholds.persistent_min {
                PartitionLabel::Persistent
            } else if f < thresholds.cloud_max {
                PartitionLabel::Cloud
            } else {
                PartitionLabel::Shell
            };
            FamilyPartition {
                family: row.family(),
                name: row.name().to_string(),
                frequency: f,
                label,
                posterior: ClassPosterior::certain(label),
                responsibilities: Vec::new(),
            }
        })
        .collect();
    PartitionResult {
        families,
        method: PartitionMethod::Thresholds,
        log_likelihood: None,
        iterations: 0,
        warning: None,
        component_means: Vec::new(),
    }
}
