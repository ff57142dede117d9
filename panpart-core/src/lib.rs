//! Shared primitives, traits, and utilities for the panpart pangenome toolkit.
//!
//! `panpart-core` provides the foundation that the other panpart crates build on:
//!
//! - **Error types** — [`PanError`] and [`Result`] for structured error handling
//! - **Traits** — [`Summarizable`] and [`Annotated`] for reporting
//! - **Log-space probabilities** — [`LogProb`] for stable likelihood sums
//! - **Bit vectors** — [`PresenceBits`] for per-family genome presence

pub mod bits;
pub mod error;
pub mod prob;
pub mod traits;

pub use bits::PresenceBits;
pub use error::{PanError, Result};
pub use prob::LogProb;
pub use traits::*;
