//! Per-worker graph deltas and their commutative merge.
//!
//! A [`GraphDelta`] captures the gene occurrences and adjacency tallies that
//! one or more genomes contribute to the pangenome, keyed by family and genome
//! names, without touching shared state. Deltas built on independent
//! workers are combined with [`GraphDelta::merge`], which is commutative and
//! associative, and the result is applied to a [`NeighborJoinGraph`] in one step.
//!
//! [`NeighborJoinGraph`]: crate::graph::NeighborJoinGraph

use std::collections::{BTreeMap, BTreeSet};

use panpart_core::{PanError, Result};

use crate::config::{EmptyGenomePolicy, IngestConfig};
use crate::genome::{Genome, Strand};

/// A gene as recorded in a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeneRecord {
    pub family: String,
    pub contig: String,
    pub position: u64,
    pub strand: Strand,
}

/// Adjacency observations for one unordered family pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EdgeTally {
    pub genomes: BTreeSet<String>,
    pub gene_pairs: usize,
}

/// Contributions of a set of genomes, not yet applied to a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDelta {
    /// Genome → its genes in contig order.
    pub(crate) genes: BTreeMap<String, Vec<GeneRecord>>,
    /// Lexicographically ordered family pair → tally.
    pub(crate) edges: BTreeMap<(String, String), EdgeTally>,
}

impl GraphDelta {
    /// Build the delta for a single genome.
    ///
    /// Consecutive genes on a contig produce one adjacency each; a contig that
    /// wraps (per `config.circular`) and holds at least two genes also links
    /// its last gene to its first. Consecutive genes of the same family yield
    /// a self-loop. Genes on different contigs are never adjacent.
    ///
    /// Returns `Ok(None)` for a gene-less genome under
    /// [`EmptyGenomePolicy::Skip`].
    ///
    /// # Errors
    ///
    /// Returns [`PanError::EmptyGenome`] for a gene-less genome under
    /// [`EmptyGenomePolicy::Reject`].
    pub fn from_genome(genome: &Genome, config: &IngestConfig) -> Result<Option<Self>> {
        if genome.is_empty() {
            return match config.empty_genome {
                EmptyGenomePolicy::Reject => Err(PanError::EmptyGenome(genome.id.clone())),
                EmptyGenomePolicy::Skip => {
                    log::warn!("skipping genome {}: no genes", genome.id);
                    Ok(None)
                }
            };
        }

        let mut delta = GraphDelta::default();
        let mut records = Vec::with_capacity(genome.gene_count());
        for contig in &genome.contigs {
            for gene in &contig.genes {
                records.push(GeneRecord {
                    family: gene.family.clone(),
                    contig: contig.name.clone(),
                    position: gene.position,
                    strand: gene.strand,
                });
            }
            for pair in contig.genes.windows(2) {
                delta.add_adjacency(&pair[0].family, &pair[1].family, &genome.id);
            }
            if contig.genes.len() >= 2 && config.circular.wraps(contig.circular) {
                let first = &contig.genes[0];
                let last = &contig.genes[contig.genes.len() - 1];
                delta.add_adjacency(&last.family, &first.family, &genome.id);
            }
        }
        log::debug!(
            "genome {}: {} genes, {} distinct adjacencies",
            genome.id,
            records.len(),
            delta.edges.len()
        );
        delta.genes.insert(genome.id.clone(), records);
        Ok(Some(delta))
    }

    /// Combine two deltas.
    ///
    /// The operation is commutative and associative, so partial deltas may be
    /// reduced in any order or tree shape.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::DuplicateGenome`] if both deltas contain the same genome.
    pub fn merge(mut self, other: GraphDelta) -> Result<GraphDelta> {
        if let Some(dup) = other.genes.keys().find(|g| self.genes.contains_key(*g)) {
            return Err(PanError::DuplicateGenome(dup.clone()));
        }
        self.genes.extend(other.genes);
        for (key, tally) in other.edges {
            let entry = self.edges.entry(key).or_default();
            entry.genomes.extend(tally.genomes);
            entry.gene_pairs += tally.gene_pairs;
        }
        Ok(self)
    }

    /// Names of the genomes in this delta, ascending.
    pub fn genomes(&self) -> impl Iterator<Item = &str> + '_ {
        self.genes.keys().map(String::as_str)
    }

    /// Number of genomes in this delta.
    pub fn genome_count(&self) -> usize {
        self.genes.len()
    }

    /// Number of distinct family pairs observed.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the delta carries nothing.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    fn add_adjacency(&mut self, a: &str, b: &str, genome: &str) {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        let tally = self.edges.entry(key).or_default();
        tally.genomes.insert(genome.to_string());
        tally.gene_pairs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircularHandling;
    use crate::genome::Contig;

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn linear_adjacencies() {
        let g = Genome::from_families("g1", &["A", "B", "C"], false);
        let d = GraphDelta::from_genome(&g, &IngestConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(d.edge_count(), 2);
        assert!(d.edges.contains_key(&pair("A", "B")));
        assert!(d.edges.contains_key(&pair("B", "C")));
    }

    #[test]
    fn circular_wraparound() {
        let g = Genome::from_families("g1", &["A", "B", "C"], true);
        let d = GraphDelta::from_genome(&g, &IngestConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(d.edge_count(), 3);
        assert!(d.edges.contains_key(&pair("A", "C")));
    }

    #[test]
    fn forced_linear_ignores_flag() {
        let g = Genome::from_families("g1", &["A", "B", "C"], true);
        let config = IngestConfig {
            circular: CircularHandling::AllLinear,
            ..IngestConfig::default()
        };
        let d = GraphDelta::from_genome(&g, &config).unwrap().unwrap();
        assert_eq!(d.edge_count(), 2);
    }

    #[test]
    fn single_gene_circular_contig_has_no_loop() {
        let g = Genome::from_families("g1", &["A"], true);
        let d = GraphDelta::from_genome(&g, &IngestConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(d.edge_count(), 0);
        assert_eq!(d.genome_count(), 1);
    }

    #[test]
    fn self_loop_recorded() {
        let g = Genome::from_families("g1", &["A", "A", "B"], false);
        let d = GraphDelta::from_genome(&g, &IngestConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(d.edges[&pair("A", "A")].gene_pairs, 1);
        assert!(d.edges.contains_key(&pair("A", "B")));
    }

    #[test]
    fn contigs_are_not_joined() {
        let mut c1 = Contig::new("c1", false);
        c1.push(crate::genome::GeneOccurrence::new("A", Strand::Forward, 0));
        let mut c2 = Contig::new("c2", false);
        c2.push(crate::genome::GeneOccurrence::new("B", Strand::Forward, 0));
        let g = Genome::new("g1").with_contig(c1).with_contig(c2);
        let d = GraphDelta::from_genome(&g, &IngestConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(d.edge_count(), 0);
    }

    #[test]
    fn empty_genome_policy() {
        let g = Genome::new("empty");
        assert_eq!(
            GraphDelta::from_genome(&g, &IngestConfig::default()).unwrap(),
            None
        );
        let reject = IngestConfig {
            empty_genome: EmptyGenomePolicy::Reject,
            ..IngestConfig::default()
        };
        assert_eq!(
            GraphDelta::from_genome(&g, &reject),
            Err(PanError::EmptyGenome("empty".into()))
        );
    }

    #[test]
    fn merge_is_commutative() {
        let config = IngestConfig::default();
        let a = GraphDelta::from_genome(&Genome::from_families("g1", &["A", "B"], false), &config)
            .unwrap()
            .unwrap();
        let b = GraphDelta::from_genome(&Genome::from_families("g2", &["B", "A", "C"], false), &config)
            .unwrap()
            .unwrap();
        let ab = a.clone().merge(b.clone()).unwrap();
        let ba = b.merge(a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.edges[&pair("A", "B")].genomes.len(), 2);
    }

    #[test]
    fn merge_rejects_duplicate_genome() {
        let config = IngestConfig::default();
        let g = Genome::from_families("g1", &["A", "B"], false);
        let a = GraphDelta::from_genome(&g, &config).unwrap().unwrap();
        let err = a.clone().merge(a).unwrap_err();
        assert_eq!(err, PanError::DuplicateGenome("g1".into()));
    }
}
