//! Configuration values consumed by ingestion and partitioning.
//!
//! All structs are plain values with documented defaults; nothing here reads
//! files or environment variables.

use panpart_core::{PanError, Result};

/// What to do with a genome that carries no genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmptyGenomePolicy {
    /// Fail ingestion with [`PanError::EmptyGenome`].
    Reject,
    /// Log a warning and leave the genome out of the pangenome.
    #[default]
    Skip,
}

/// How contig circularity flags are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircularHandling {
    /// Honor each contig's own `circular` flag.
    #[default]
    PerContig,
    /// Treat every contig as linear.
    AllLinear,
    /// Treat every contig as circular.
    AllCircular,
}

impl CircularHandling {
    /// Whether a contig flagged `circular` wraps around under this policy.
    pub fn wraps(self, circular: bool) -> bool {
        match self {
            CircularHandling::PerContig => circular,
            CircularHandling::AllLinear => false,
            CircularHandling::AllCircular => true,
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IngestConfig {
    /// Policy for genomes with zero genes (default: skip with a warning).
    pub empty_genome: EmptyGenomePolicy,
    /// Circular wraparound handling (default: per contig).
    pub circular: CircularHandling,
}

/// Component distribution used by the partition mixture model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentModel {
    /// Binomial over occurrence counts out of the genome total.
    #[default]
    Binomial,
    /// Normal over occurrence frequency.
    Gaussian,
    /// Beta over occurrence frequency.
    Beta,
}

/// Frequency cutoffs used when the data cannot support a mixture fit.
///
/// A family with frequency `≥ persistent_min` is persistent, one with
/// frequency `< cloud_max` is cloud, and everything in between is shell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackThresholds {
    /// Lowest frequency labelled persistent (default: 0.95).
    pub persistent_min: f64,
    /// Frequencies below this are labelled cloud (default: 0.15).
    pub cloud_max: f64,
}

impl Default for FallbackThresholds {
    fn default() -> Self {
        Self {
            persistent_min: 0.95,
            cloud_max: 0.15,
        }
    }
}

impl FallbackThresholds {
    /// Check `0 ≤ cloud_max ≤ persistent_min ≤ 1`.
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.cloud_max
            && self.cloud_max <= self.persistent_min
            && self.persistent_min <= 1.0;
        if !ordered {
            return Err(PanError::InvalidInput(format!(
                "fallback thresholds must satisfy 0 <= cloud_max ({}) <= persistent_min ({}) <= 1",
                self.cloud_max, self.persistent_min
            )));
        }
        Ok(())
    }
}

/// Partition model settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionConfig {
    /// Number of mixture components K (default: 3, minimum 2).
    pub n_components: usize,
    /// EM stops once the log-likelihood improves by less than this (default: 1e-6).
    pub tolerance: f64,
    /// EM iteration cap (default: 500). Hitting it yields a warning, not an error.
    pub max_iterations: usize,
    /// Component distribution (default: binomial).
    pub model: ComponentModel,
    /// Cutoffs applied when fewer distinct frequencies exist than components.
    /// `None` disables the fallback (default: `Some(FallbackThresholds::default())`).
    pub fallback: Option<FallbackThresholds>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            n_components: 3,
            tolerance: 1e-6,
            max_iterations: 500,
            model: ComponentModel::Binomial,
            fallback: Some(FallbackThresholds::default()),
        }
    }
}

impl PartitionConfig {
    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.n_components < 2 {
            return Err(PanError::InvalidInput(format!(
                "n_components must be at least 2, got {}",
                self.n_components
            )));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(PanError::InvalidInput(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(PanError::InvalidInput(
                "max_iterations must be at least 1".into(),
            ));
        }
        if let Some(fallback) = &self.fallback {
            fallback.validate()?;
        }
        Ok(())
    }
}

/// Everything the end-to-end pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PangenomeConfig {
    pub ingest: IngestConfig,
    pub partition: PartitionConfig,
}

impl PangenomeConfig {
    pub fn validate(&self) -> Result<()> {
        self.partition.validate()
    }
}
