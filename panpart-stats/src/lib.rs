//! Statistical methods for pangenome partitioning.
//!
//! - **Descriptive statistics** — mean, weighted moments, distinct values
//! - **Distributions** — log-gamma and log-binomial helpers
//! - **Mixture models** — deterministic EM over pluggable component families

pub mod descriptive;
pub mod distribution;
pub mod mixture;

pub use mixture::{
    BetaFamily, BinomialFamily, Component, ComponentFamily, GaussianFamily, MixtureConfig,
    MixtureFit,
};
