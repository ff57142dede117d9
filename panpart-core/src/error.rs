//! Structured error types for the panpart crates.

use thiserror::Error;

/// Unified error type for all panpart operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PanError {
    /// Lookup of a gene family that was never registered.
    #[error("unknown gene family: {0}")]
    UnknownFamily(String),

    /// A genome with no genes was offered for ingestion.
    #[error("genome {0} has no genes")]
    EmptyGenome(String),

    /// An operation received no data to work on (no genomes, no families).
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A read of derived state was attempted before the pangenome was sealed.
    #[error("pangenome is not sealed: {0}")]
    NotSealed(String),

    /// A mutation was attempted after the pangenome was sealed.
    #[error("pangenome is sealed: {0}")]
    Sealed(String),

    /// The same genome identifier was ingested twice.
    #[error("genome {0} was already ingested")]
    DuplicateGenome(String),

    /// The partition model cannot produce a valid labelling for the data.
    #[error("degenerate partition model: {reason}; {resolution}")]
    DegenerateModel {
        /// What made the data unmodelable.
        reason: String,
        /// The configuration change that would resolve it.
        resolution: String,
    },

    /// Invalid input (bad arguments, out-of-range configuration values).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the panpart crates.
pub type Result<T> = std::result::Result<T, PanError>;
