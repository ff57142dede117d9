//! The pangenome neighborhood graph.
//!
//! One node per gene family, one undirected edge per pair of families whose
//! genes are adjacent in at least one genome. The graph owns the
//! [`FamilyRegistry`] and moves through two phases: while unsealed it accepts
//! genomes, once [`sealed`](NeighborJoinGraph::seal) every mutation fails fast
//! and derived views (occurrence matrix, partitioning) become available.

use std::collections::{BTreeSet, HashMap};

use panpart_core::{Annotated, PanError, Result, Summarizable};

use crate::config::IngestConfig;
use crate::delta::GraphDelta;
use crate::family::{FamilyId, FamilyRegistry, GenomeId};
use crate::genome::Genome;

/// Unordered pair of family handles; `a <= b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeKey {
    a: FamilyId,
    b: FamilyId,
}

impl EdgeKey {
    pub fn new(x: FamilyId, y: FamilyId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Both endpoints, smaller handle first.
    pub fn endpoints(&self) -> (FamilyId, FamilyId) {
        (self.a, self.b)
    }

    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }

    /// The endpoint opposite `family`, or `None` if `family` is not an endpoint.
    pub fn other(&self, family: FamilyId) -> Option<FamilyId> {
        if family == self.a {
            Some(self.b)
        } else if family == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// An adjacency between two gene families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyEdge {
    key: EdgeKey,
    genomes: BTreeSet<GenomeId>,
    gene_pairs: usize,
}

impl AdjacencyEdge {
    fn new(key: EdgeKey) -> Self {
        Self {
            key,
            genomes: BTreeSet::new(),
            gene_pairs: 0,
        }
    }

    pub fn key(&self) -> EdgeKey {
        self.key
    }

    /// Number of genomes in which the adjacency was observed.
    pub fn multiplicity(&self) -> usize {
        self.genomes.len()
    }

    /// Genomes contributing this adjacency.
    pub fn genomes(&self) -> impl Iterator<Item = GenomeId> + '_ {
        self.genomes.iter().copied()
    }

    /// Total adjacent gene pairs observed across all genomes.
    pub fn gene_pairs(&self) -> usize {
        self.gene_pairs
    }

    pub fn is_self_loop(&self) -> bool {
        self.key.is_self_loop()
    }
}

/// Gene-family adjacency graph under construction or sealed.
#[derive(Debug, Clone, Default)]
pub struct NeighborJoinGraph {
    registry: FamilyRegistry,
    edges: HashMap<EdgeKey, AdjacencyEdge>,
    neighbors: HashMap<FamilyId, BTreeSet<FamilyId>>,
    config: IngestConfig,
}

impl NeighborJoinGraph {
    /// An empty graph with the given ingestion settings.
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Add one genome.
    ///
    /// Returns `false` if the genome had no genes and was skipped.
    ///
    /// # Errors
    ///
    /// - [`PanError::Sealed`] after [`seal`](Self::seal).
    /// - [`PanError::EmptyGenome`] for a gene-less genome under the reject policy.
    /// - [`PanError::DuplicateGenome`] if the genome ID was already ingested.
    pub fn ingest_genome(&mut self, genome: &Genome) -> Result<bool> {
        self.registry.ensure_unsealed("ingest_genome")?;
        match GraphDelta::from_genome(genome, &self.config)? {
            Some(delta) => {
                self.apply(delta)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Add a batch of genomes, building per-genome deltas independently.
    ///
    /// With the `parallel` feature the deltas are built and reduced on the
    /// rayon pool. The batch is applied atomically: on error nothing from it
    /// is recorded. Returns the number of genomes ingested (skipped empty
    /// genomes are not counted).
    ///
    /// # Errors
    ///
    /// Same conditions as [`ingest_genome`](Self::ingest_genome), also raised
    /// for a genome ID repeated within the batch.
    pub fn ingest_genomes(&mut self, genomes: &[Genome]) -> Result<usize> {
        self.registry.ensure_unsealed("ingest_genomes")?;
        let config = self.config;

        #[cfg(feature = "parallel")]
        let merged = {
            use rayon::prelude::*;
            genomes
                .par_iter()
                .map(|g| GraphDelta::from_genome(g, &config).map(Option::unwrap_or_default))
                .try_reduce(GraphDelta::default, GraphDelta::merge)?
        };
        #[cfg(not(feature = "parallel"))]
        let merged = genomes.iter().try_fold(GraphDelta::default(), |acc, g| {
            let delta = GraphDelta::from_genome(g, &config)?.unwrap_or_default();
            acc.merge(delta)
        })?;

        let count = merged.genome_count();
        self.apply(merged)?;
        log::info!(
            "ingested {} of {} genomes ({} families, {} edges)",
            count,
            genomes.len(),
            self.registry.len(),
            self.edges.len()
        );
        Ok(count)
    }

    /// Apply a merged delta.
    ///
    /// # Errors
    ///
    /// [`PanError::Sealed`] after sealing, [`PanError::DuplicateGenome`] if any
    /// genome of the delta is already part of the graph. Either error leaves
    /// the graph unchanged.
    pub fn apply(&mut self, delta: GraphDelta) -> Result<()> {
        self.registry.ensure_unsealed("apply")?;
        if let Some(dup) = delta.genomes().find(|g| self.registry.contains_genome(g)) {
            return Err(PanError::DuplicateGenome(dup.to_string()));
        }

        for (genome, genes) in &delta.genes {
            for gene in genes {
                self.registry.record_gene(
                    &gene.family,
                    genome,
                    &gene.contig,
                    gene.position,
                    gene.strand,
                )?;
            }
        }

        for ((a, b), tally) in delta.edges {
            let key = EdgeKey::new(self.registry.id_of(&a)?, self.registry.id_of(&b)?);
            let mut genome_ids = Vec::with_capacity(tally.genomes.len());
            for g in &tally.genomes {
                let id = self.registry.genome_id(g).ok_or_else(|| {
                    PanError::Other(format!("adjacency references unrecorded genome {}", g))
                })?;
                genome_ids.push(id);
            }
            let edge = self
                .edges
                .entry(key)
                .or_insert_with(|| AdjacencyEdge::new(key));
            edge.genomes.extend(genome_ids);
            edge.gene_pairs += tally.gene_pairs;

            let (x, y) = key.endpoints();
            self.neighbors.entry(x).or_default().insert(y);
            self.neighbors.entry(y).or_default().insert(x);
        }
        Ok(())
    }

    /// Freeze the graph and its registry. Idempotent.
    pub fn seal(&mut self) {
        if !self.registry.is_sealed() {
            self.registry.seal();
            log::info!(
                "sealed pangenome: {} genomes, {} families, {} edges",
                self.registry.total_genomes(),
                self.registry.len(),
                self.edges.len()
            );
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.registry.is_sealed()
    }

    /// The family registry owned by this graph.
    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    /// Number of nodes (families).
    pub fn family_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of ingested genomes.
    pub fn genome_count(&self) -> usize {
        self.registry.total_genomes()
    }

    /// Number of edges, self-loops included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = &AdjacencyEdge> + '_ {
        self.edges.values()
    }

    /// Edge by handle pair.
    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&AdjacencyEdge> {
        self.edges.get(key)
    }

    /// Edge between two families by name, `None` if they were never adjacent.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if either family is not registered.
    pub fn edge(&self, a: &str, b: &str) -> Result<Option<&AdjacencyEdge>> {
        let key = EdgeKey::new(self.registry.id_of(a)?, self.registry.id_of(b)?);
        Ok(self.edges.get(&key))
    }

    /// Neighbor handles of a family, ascending. A self-loop lists the family itself.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family is not registered.
    pub fn neighbors(&self, family: &str) -> Result<Vec<FamilyId>> {
        let id = self.registry.id_of(family)?;
        Ok(self
            .neighbors
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Family names of an edge's endpoints.
    pub fn endpoint_names(&self, edge: &AdjacencyEdge) -> (&str, &str) {
        let (a, b) = edge.key.endpoints();
        (self.family_name(a), self.family_name(b))
    }

    pub(crate) fn family_name(&self, id: FamilyId) -> &str {
        self.registry.get(id).map(|f| f.name()).unwrap_or("")
    }
}

impl Summarizable for NeighborJoinGraph {
    fn summary(&self) -> String {
        format!(
            "NeighborJoinGraph: {} genomes, {} families, {} edges{}",
            self.genome_count(),
            self.family_count(),
            self.edge_count(),
            if self.is_sealed() { " (sealed)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptyGenomePolicy;

    fn multiplicity(g: &NeighborJoinGraph, a: &str, b: &str) -> usize {
        g.edge(a, b).unwrap().map_or(0, AdjacencyEdge::multiplicity)
    }

    #[test]
    fn single_linear_genome() {
        let mut g = NeighborJoinGraph::default();
        assert!(g.ingest_genome(&Genome::from_families("g1", &["A", "B", "C"], false)).unwrap());
        assert_eq!(g.edge_count(), 2);
        assert_eq!(multiplicity(&g, "A", "B"), 1);
        assert_eq!(multiplicity(&g, "B", "C"), 1);
        assert_eq!(multiplicity(&g, "A", "C"), 0);
        assert_eq!(g.genome_count(), 1);
    }

    #[test]
    fn circular_adds_closing_edge() {
        let mut g = NeighborJoinGraph::default();
        g.ingest_genome(&Genome::from_families("g1", &["A", "B", "C"], true))
            .unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(multiplicity(&g, "C", "A"), 1);
    }

    #[test]
    fn self_loop_edge() {
        let mut g = NeighborJoinGraph::default();
        g.ingest_genome(&Genome::from_families("g1", &["A", "A", "B"], false))
            .unwrap();
        let loop_edge = g.edge("A", "A").unwrap().unwrap();
        assert!(loop_edge.is_self_loop());
        assert_eq!(loop_edge.multiplicity(), 1);
        assert_eq!(multiplicity(&g, "A", "B"), 1);
        let a = g.registry().id_of("A").unwrap();
        assert!(g.neighbors("A").unwrap().contains(&a));
    }

    #[test]
    fn multiplicity_counts_genomes_not_pairs() {
        let mut g = NeighborJoinGraph::default();
        g.ingest_genome(&Genome::from_families("g1", &["A", "B", "A", "B"], false))
            .unwrap();
        g.ingest_genome(&Genome::from_families("g2", &["B", "A"], false))
            .unwrap();
        let e = g.edge("A", "B").unwrap().unwrap();
        assert_eq!(e.multiplicity(), 2);
        assert_eq!(e.gene_pairs(), 4);
    }

    #[test]
    fn sealed_graph_rejects_ingestion() {
        let mut g = NeighborJoinGraph::default();
        g.ingest_genome(&Genome::from_families("g1", &["A", "B"], false))
            .unwrap();
        g.seal();
        let err = g
            .ingest_genome(&Genome::from_families("g2", &["A", "B"], false))
            .unwrap_err();
        assert!(matches!(err, PanError::Sealed(_)));
        assert!(g.ingest_genomes(&[]).is_err());
        assert_eq!(g.genome_count(), 1);
    }

    #[test]
    fn duplicate_genome_rejected() {
        let mut g = NeighborJoinGraph::default();
        let genome = Genome::from_families("g1", &["A", "B"], false);
        g.ingest_genome(&genome).unwrap();
        assert_eq!(
            g.ingest_genome(&genome),
            Err(PanError::DuplicateGenome("g1".into()))
        );
        assert_eq!(multiplicity(&g, "A", "B"), 1);
    }

    #[test]
    fn empty_genome_skip_and_reject() {
        let mut g = NeighborJoinGraph::default();
        assert!(!g.ingest_genome(&Genome::new("empty")).unwrap());
        assert_eq!(g.genome_count(), 0);

        let mut strict = NeighborJoinGraph::new(IngestConfig {
            empty_genome: EmptyGenomePolicy::Reject,
            ..IngestConfig::default()
        });
        assert_eq!(
            strict.ingest_genome(&Genome::new("empty")),
            Err(PanError::EmptyGenome("empty".into()))
        );
    }

    #[test]
    fn batch_is_atomic() {
        let mut g = NeighborJoinGraph::default();
        let batch = vec![
            Genome::from_families("g1", &["A", "B"], false),
            Genome::from_families("g1", &["B", "C"], false),
        ];
        assert!(matches!(
            g.ingest_genomes(&batch),
            Err(PanError::DuplicateGenome(_))
        ));
        assert_eq!(g.genome_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn batch_matches_serial() {
        let genomes = vec![
            Genome::from_families("g1", &["A", "B", "C"], false),
            Genome::from_families("g2", &["A", "C", "B"], true),
            Genome::new("empty"),
        ];
        let mut serial = NeighborJoinGraph::default();
        for genome in &genomes {
            serial.ingest_genome(genome).unwrap();
        }
        let mut batch = NeighborJoinGraph::default();
        assert_eq!(batch.ingest_genomes(&genomes).unwrap(), 2);
        assert_eq!(serial.edge_count(), batch.edge_count());
        for (a, b) in [("A", "B"), ("B", "C"), ("A", "C")] {
            assert_eq!(multiplicity(&serial, a, b), multiplicity(&batch, a, b));
        }
    }

    #[test]
    fn unknown_family_lookup() {
        let g = NeighborJoinGraph::default();
        assert!(matches!(g.edge("A", "B"), Err(PanError::UnknownFamily(_))));
        assert!(matches!(g.neighbors("A"), Err(PanError::UnknownFamily(_))));
    }

    #[test]
    fn endpoint_names_and_summary() {
        let mut g = NeighborJoinGraph::default();
        g.ingest_genome(&Genome::from_families("g1", &["B", "A"], false))
            .unwrap();
        let e = g.edges().next().unwrap();
        let (x, y) = g.endpoint_names(e);
        let mut names = [x, y];
        names.sort();
        assert_eq!(names, ["A", "B"]);
        g.seal();
        assert!(g.summary().ends_with("(sealed)"));
    }
}
