//! Reporting traits implemented by graph entities and results.

/// An entity addressed by a stable, human-readable name.
pub trait Annotated {
    /// Identifier as supplied by the caller (family ID, genome ID, ...).
    fn name(&self) -> &str;
}

/// One-line textual digest, used in log messages.
pub trait Summarizable {
    fn summary(&self) -> String;
}
