//! Writing partition labels back onto the neighborhood graph.
//!
//! [`GraphAnnotator::annotate`] consumes a sealed [`NeighborJoinGraph`] and a
//! [`PartitionResult`] and yields the [`PartitionedGraph`]: every node carries
//! a label, frequency, and class posterior; every edge carries an
//! [`EdgeClass`] derived from its endpoints.

use core::fmt;
use std::collections::HashMap;

use panpart_core::{Annotated, PanError, Result, Summarizable};
use panpart_stats::descriptive::mean;

use crate::family::{FamilyId, FamilyRegistry, GeneFamily};
use crate::graph::{AdjacencyEdge, EdgeKey, NeighborJoinGraph};
use crate::partition::{ClassPosterior, PartitionLabel, PartitionResult};

/// Conservation class of an adjacency, derived from its endpoint labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeClass {
    Persistent,
    Shell,
    Cloud,
}

impl EdgeClass {
    /// An edge is only as conserved as its least conserved endpoint:
    /// persistent needs both endpoints persistent, any cloud endpoint makes
    /// it cloud, everything else is shell.
    pub fn from_endpoints(a: PartitionLabel, b: PartitionLabel) -> Self {
        match (a, b) {
            (PartitionLabel::Persistent, PartitionLabel::Persistent) => EdgeClass::Persistent,
            (PartitionLabel::Cloud, _) | (_, PartitionLabel::Cloud) => EdgeClass::Cloud,
            _ => EdgeClass::Shell,
        }
    }
}

impl fmt::Display for EdgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeClass::Persistent => write!(f, "persistent edge"),
            EdgeClass::Shell => write!(f, "shell edge"),
            EdgeClass::Cloud => write!(f, "cloud edge"),
        }
    }
}

/// Partition attributes attached to a node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeAnnotation {
    pub label: PartitionLabel,
    pub frequency: f64,
    pub posterior: ClassPosterior,
}

/// Per-class tallies of nodes or edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionCounts {
    pub persistent: usize,
    pub shell: usize,
    pub cloud: usize,
}

impl PartitionCounts {
    pub fn total(&self) -> usize {
        self.persistent + self.shell + self.cloud
    }
}

/// Applies partition results to graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphAnnotator;

impl GraphAnnotator {
    pub fn new() -> Self {
        Self
    }

    /// Attach labels to every node and derive every edge class.
    ///
    /// Annotating with the same partition twice yields identical node and
    /// edge annotations.
    ///
    /// # Errors
    ///
    /// - [`PanError::NotSealed`] if the graph still accepts genomes.
    /// - [`PanError::UnknownFamily`] if `partition` labels a family the graph
    ///   does not contain.
    /// - [`PanError::InvalidInput`] if a family of the graph has no label.
    pub fn annotate(
        &self,
        graph: NeighborJoinGraph,
        partition: &PartitionResult,
    ) -> Result<PartitionedGraph> {
        if !graph.is_sealed() {
            return Err(PanError::NotSealed(
                "graph must be sealed before annotation".into(),
            ));
        }

        let registry = graph.registry();
        let mut slots: Vec<Option<NodeAnnotation>> = vec![None; registry.len()];
        for fam in &partition.families {
            let id = registry.id_of(&fam.name)?;
            slots[id.index()] = Some(NodeAnnotation {
                label: fam.label,
                frequency: fam.frequency,
                posterior: fam.posterior,
            });
        }

        let mut nodes = Vec::with_capacity(slots.len());
        for (slot, fam) in slots.into_iter().zip(registry.families()) {
            match slot {
                Some(node) => nodes.push(node),
                None => {
                    return Err(PanError::InvalidInput(format!(
                        "gene family {} has no partition label",
                        fam.name()
                    )))
                }
            }
        }

        let edge_classes: HashMap<EdgeKey, EdgeClass> = graph
            .edges()
            .map(|edge| {
                let (a, b) = edge.key().endpoints();
                let class = EdgeClass::from_endpoints(nodes[a.index()].label, nodes[b.index()].label);
                (edge.key(), class)
            })
            .collect();

        let annotated = PartitionedGraph {
            graph,
            nodes,
            edge_classes,
        };
        log::info!("annotated {}", annotated.summary());
        Ok(annotated)
    }
}

/// A sealed neighborhood graph with partition labels on nodes and classes on edges.
#[derive(Debug, Clone)]
pub struct PartitionedGraph {
    graph: NeighborJoinGraph,
    /// Indexed by `FamilyId::index`.
    nodes: Vec<NodeAnnotation>,
    edge_classes: HashMap<EdgeKey, EdgeClass>,
}

impl PartitionedGraph {
    /// The underlying adjacency graph.
    pub fn graph(&self) -> &NeighborJoinGraph {
        &self.graph
    }

    pub fn registry(&self) -> &FamilyRegistry {
        self.graph.registry()
    }

    /// Give the graph back, dropping the annotations.
    pub fn into_graph(self) -> NeighborJoinGraph {
        self.graph
    }

    /// Re-run annotation with another partition of the same graph.
    pub fn reannotate(self, partition: &PartitionResult) -> Result<PartitionedGraph> {
        GraphAnnotator.annotate(self.graph, partition)
    }

    /// Annotation of a family by name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family is not in the graph.
    pub fn node(&self, family: &str) -> Result<&NodeAnnotation> {
        let id = self.registry().id_of(family)?;
        self.node_by_id(id)
            .ok_or_else(|| PanError::UnknownFamily(family.to_string()))
    }

    pub fn node_by_id(&self, id: FamilyId) -> Option<&NodeAnnotation> {
        self.nodes.get(id.index())
    }

    /// Partition label of a family by name.
    pub fn label(&self, family: &str) -> Result<PartitionLabel> {
        self.node(family).map(|n| n.label)
    }

    /// Class of the edge between two families, `None` if they are not adjacent.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if either family is not in the graph.
    pub fn edge_class(&self, a: &str, b: &str) -> Result<Option<EdgeClass>> {
        Ok(self
            .graph
            .edge(a, b)?
            .and_then(|edge| self.edge_classes.get(&edge.key()).copied()))
    }

    /// Class of an edge of this graph.
    pub fn class_of(&self, edge: &AdjacencyEdge) -> Option<EdgeClass> {
        self.edge_classes.get(&edge.key()).copied()
    }

    /// Every family with its annotation, in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = (&GeneFamily, &NodeAnnotation)> + '_ {
        self.registry().families().zip(self.nodes.iter())
    }

    /// Every edge with its class, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = (&AdjacencyEdge, EdgeClass)> + '_ {
        self.graph
            .edges()
            .filter_map(|edge| self.class_of(edge).map(|class| (edge, class)))
    }

    /// Names of the families labelled `label`, ascending.
    pub fn families_with(&self, label: PartitionLabel) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .nodes()
            .filter(|(_, node)| node.label == label)
            .map(|(fam, _)| fam.name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Edges of class `class`.
    pub fn edges_with(&self, class: EdgeClass) -> Vec<&AdjacencyEdge> {
        self.edges()
            .filter(|&(_, c)| c == class)
            .map(|(edge, _)| edge)
            .collect()
    }

    /// Neighbors of a family with their labels, ascending by handle.
    pub fn neighbors(&self, family: &str) -> Result<Vec<(&str, PartitionLabel)>> {
        Ok(self
            .graph
            .neighbors(family)?
            .into_iter()
            .filter_map(|id| {
                self.node_by_id(id)
                    .map(|node| (self.graph.family_name(id), node.label))
            })
            .collect())
    }

    /// Number of families per label.
    pub fn partition_counts(&self) -> PartitionCounts {
        let mut counts = PartitionCounts::default();
        for node in &self.nodes {
            match node.label {
                PartitionLabel::Persistent => counts.persistent += 1,
                PartitionLabel::Shell => counts.shell += 1,
                PartitionLabel::Cloud => counts.cloud += 1,
            }
        }
        counts
    }

    /// Number of edges per class.
    pub fn edge_counts(&self) -> PartitionCounts {
        let mut counts = PartitionCounts::default();
        for class in self.edge_classes.values() {
            match class {
                EdgeClass::Persistent => counts.persistent += 1,
                EdgeClass::Shell => counts.shell += 1,
                EdgeClass::Cloud => counts.cloud += 1,
            }
        }
        counts
    }

    /// Mean occurrence frequency of the families labelled `label`.
    pub fn mean_frequency(&self, label: PartitionLabel) -> Option<f64> {
        let freqs: Vec<f64> = self
            .nodes
            .iter()
            .filter(|node| node.label == label)
            .map(|node| node.frequency)
            .collect();
        mean(&freqs).ok()
    }

    /// Families duplicated in at least `dup_margin` of the genomes containing them.
    ///
    /// A genome counts as duplicating a family when it holds more than one
    /// member gene of it. With `persistent_only`, only persistent families are
    /// considered. Result is ascending by name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::InvalidInput`] if `dup_margin` is outside `[0, 1]`.
    pub fn multigenic_families(
        &self,
        dup_margin: f64,
        persistent_only: bool,
    ) -> Result<Vec<&GeneFamily>> {
        if !(0.0..=1.0).contains(&dup_margin) {
            return Err(PanError::InvalidInput(format!(
                "dup_margin must lie in [0, 1], got {}",
                dup_margin
            )));
        }
        let mut found: Vec<&GeneFamily> = self
            .nodes()
            .filter(|(_, node)| !persistent_only || node.label == PartitionLabel::Persistent)
            .filter(|(fam, _)| {
                let present = fam.occurrence_count();
                present > 0 && fam.multicopy_genomes() as f64 / present as f64 >= dup_margin
            })
            .map(|(fam, _)| fam)
            .collect();
        found.sort_unstable_by(|a, b| a.name().cmp(b.name()));
        Ok(found)
    }
}

impl Summarizable for PartitionedGraph {
    fn summary(&self) -> String {
        let nodes = self.partition_counts();
        let edges = self.edge_counts();
        format!(
            "PartitionedGraph: {} families ({} persistent, {} shell, {} cloud), \
             {} edges ({} persistent, {} shell, {} cloud)",
            nodes.total(),
            nodes.persistent,
            nodes.shell,
            nodes.cloud,
            edges.total(),
            edges.persistent,
            edges.shell,
            edges.cloud
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackThresholds, PartitionConfig};
    use crate::genome::Genome;
    use crate::occurrence::OccurrenceMatrix;
    use crate::partition::PartitionModel;

    /// Ten genomes sharing a core `A B C`, with `S` in half and `R` in one.
    fn sealed_graph() -> NeighborJoinGraph {
        let mut g = NeighborJoinGraph::default();
        for i in 0..10 {
            let mut fams = vec!["A", "B", "C"];
            if i < 5 {
                fams.push("S");
            }
            if i == 0 {
                fams.push("R");
                fams.push("A");
            }
            g.ingest_genome(&Genome::from_families(format!("g{}", i), &fams, false))
                .unwrap();
        }
        g.seal();
        g
    }

    fn thresholds() -> PartitionModel {
        PartitionModel::new(PartitionConfig {
            n_components: 4,
            fallback: Some(FallbackThresholds::default()),
            ..PartitionConfig::default()
        })
        .unwrap()
    }

    fn annotated() -> PartitionedGraph {
        let graph = sealed_graph();
        let matrix = OccurrenceMatrix::compute(graph.registry()).unwrap();
        let partition = thresholds().fit(&matrix).unwrap();
        GraphAnnotator.annotate(graph, &partition).unwrap()
    }

    #[test]
    fn edge_class_rule() {
        use PartitionLabel::*;
        assert_eq!(EdgeClass::from_endpoints(Persistent, Persistent), EdgeClass::Persistent);
        assert_eq!(EdgeClass::from_endpoints(Persistent, Shell), EdgeClass::Shell);
        assert_eq!(EdgeClass::from_endpoints(Shell, Shell), EdgeClass::Shell);
        assert_eq!(EdgeClass::from_endpoints(Persistent, Cloud), EdgeClass::Cloud);
        assert_eq!(EdgeClass::from_endpoints(Cloud, Shell), EdgeClass::Cloud);
        assert_eq!(EdgeClass::Cloud.to_string(), "cloud edge");
    }

    #[test]
    fn nodes_and_edges_are_labelled() {
        let pg = annotated();
        assert_eq!(pg.label("A").unwrap(), PartitionLabel::Persistent);
        assert_eq!(pg.label("S").unwrap(), PartitionLabel::Shell);
        assert_eq!(pg.label("R").unwrap(), PartitionLabel::Cloud);
        assert_eq!(pg.edge_class("A", "B").unwrap(), Some(EdgeClass::Persistent));
        assert_eq!(pg.edge_class("C", "S").unwrap(), Some(EdgeClass::Shell));
        assert_eq!(pg.edge_class("S", "R").unwrap(), Some(EdgeClass::Cloud));
        assert_eq!(pg.edge_class("A", "S").unwrap(), None);
        assert!(pg.edge_class("A", "Z").is_err());
        assert_eq!(pg.edges().count(), pg.graph().edge_count());
    }

    #[test]
    fn counts_and_queries() {
        let pg = annotated();
        let counts = pg.partition_counts();
        assert_eq!((counts.persistent, counts.shell, counts.cloud), (3, 1, 1));
        assert_eq!(pg.families_with(PartitionLabel::Persistent), vec!["A", "B", "C"]);
        assert_eq!(pg.edge_counts().total(), pg.graph().edge_count());
        assert_eq!(pg.edges_with(EdgeClass::Persistent).len(), 2);
        assert_eq!(pg.mean_frequency(PartitionLabel::Persistent), Some(1.0));
        assert_eq!(pg.mean_frequency(PartitionLabel::Cloud), Some(0.1));

        let neighbors = pg.neighbors("S").unwrap();
        assert!(neighbors.contains(&("C", PartitionLabel::Persistent)));
        assert!(neighbors.contains(&("R", PartitionLabel::Cloud)));
        assert!(pg.summary().starts_with("PartitionedGraph: 5 families"));
    }

    #[test]
    fn multigenic() {
        let pg = annotated();
        // A is doubled in g0 only: 1 of 10 genomes.
        let names = |v: Vec<&GeneFamily>| v.iter().map(|f| f.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(pg.multigenic_families(0.1, true).unwrap()), vec!["A"]);
        assert!(pg.multigenic_families(0.2, false).unwrap().is_empty());
        assert!(pg.multigenic_families(1.5, false).is_err());
    }

    #[test]
    fn unsealed_graph_rejected() {
        let mut graph = NeighborJoinGraph::default();
        graph
            .ingest_genome(&Genome::from_families("g1", &["A"], false))
            .unwrap();
        let mut sealed = graph.clone();
        sealed.seal();
        let matrix = OccurrenceMatrix::compute(sealed.registry()).unwrap();
        let partition = thresholds().fit(&matrix).unwrap();
        assert!(matches!(
            GraphAnnotator.annotate(graph, &partition),
            Err(PanError::NotSealed(_))
        ));
    }

    #[test]
    fn missing_label_rejected() {
        let graph = sealed_graph();
        let matrix = OccurrenceMatrix::compute(graph.registry()).unwrap();
        let mut partition = thresholds().fit(&matrix).unwrap();
        partition.families.retain(|f| f.name != "S");
        assert!(matches!(
            GraphAnnotator.annotate(graph, &partition),
            Err(PanError::InvalidInput(_))
        ));
    }

    #[test]
    fn reannotation_is_idempotent() {
        let graph = sealed_graph();
        let matrix = OccurrenceMatrix::compute(graph.registry()).unwrap();
        let partition = thresholds().fit(&matrix).unwrap();
        let first = GraphAnnotator.annotate(graph, &partition).unwrap();
        let nodes = first.nodes.clone();
        let edges = first.edge_classes.clone();
        let second = first.reannotate(&partition).unwrap();
        assert_eq!(second.nodes, nodes);
        assert_eq!(second.edge_classes, edges);
    }
}
