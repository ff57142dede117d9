//! Pangenome neighborhood graph construction and statistical partitioning.
//!
//! This crate turns genomes, given as ordered gene-family sequences, into a
//! partitioned pangenome graph:
//!
//! - **Input model** — [`Genome`], [`Contig`], [`GeneOccurrence`], [`Strand`]
//! - **Family registry** — [`FamilyRegistry`] owns every [`GeneFamily`] and its
//!   cross-genome occurrences
//! - **Neighborhood graph** — [`NeighborJoinGraph`] with [`AdjacencyEdge`]s,
//!   built serially or from per-worker [`GraphDelta`]s
//! - **Occurrence matrix** — [`OccurrenceMatrix`], the frozen per-family
//!   frequency snapshot
//! - **Partitioning** — [`PartitionModel`] fits a mixture over frequencies and
//!   labels families [`PartitionLabel::Persistent`], `Shell`, or `Cloud`
//! - **Annotation** — [`GraphAnnotator`] produces the [`PartitionedGraph`]
//!
//! # Quick start
//!
//! ```
//! use panpart_graph::{build_partitioned_graph, Genome, PangenomeConfig, PartitionLabel};
//!
//! let genomes = vec![
//!     Genome::from_families("g1", &["dnaA", "dnaN", "recF"], false),
//!     Genome::from_families("g2", &["dnaA", "dnaN", "recF", "phage"], false),
//! ];
//! let build = build_partitioned_graph(&genomes, &PangenomeConfig::default()).unwrap();
//! assert_eq!(build.graph.label("dnaA").unwrap(), PartitionLabel::Persistent);
//! assert_eq!(build.graph.graph().edge_count(), 3);
//! ```

pub mod annotate;
pub mod config;
pub mod delta;
pub mod family;
pub mod genome;
pub mod graph;
pub mod occurrence;
pub mod partition;
pub mod pipeline;

pub use annotate::{EdgeClass, GraphAnnotator, NodeAnnotation, PartitionCounts, PartitionedGraph};
pub use config::{
    CircularHandling, ComponentModel, EmptyGenomePolicy, FallbackThresholds, IngestConfig,
    PangenomeConfig, PartitionConfig,
};
pub use delta::GraphDelta;
pub use family::{FamilyId, FamilyRegistry, GeneFamily, GenomeId, MemberGene};
pub use genome::{Contig, GeneOccurrence, Genome, Strand};
pub use graph::{AdjacencyEdge, EdgeKey, NeighborJoinGraph};
pub use occurrence::{OccurrenceMatrix, OccurrenceRow};
pub use partition::{
    ClassPosterior, FamilyPartition, NonConvergenceWarning, PartitionLabel, PartitionMethod,
    PartitionModel, PartitionResult,
};
pub use pipeline::{build_partitioned_graph, PangenomeBuild};
