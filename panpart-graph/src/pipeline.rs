//! End-to-end construction: genomes in, partitioned graph out.

use panpart_core::{Result, Summarizable};

use crate::annotate::{GraphAnnotator, PartitionedGraph};
use crate::config::PangenomeConfig;
use crate::genome::Genome;
use crate::graph::NeighborJoinGraph;
use crate::occurrence::OccurrenceMatrix;
use crate::partition::{NonConvergenceWarning, PartitionModel, PartitionResult};

/// Output of [`build_partitioned_graph`].
#[derive(Debug, Clone)]
pub struct PangenomeBuild {
    pub graph: PartitionedGraph,
    pub partition: PartitionResult,
}

impl PangenomeBuild {
    /// Set when EM hit the iteration cap; the labels are still usable.
    pub fn warning(&self) -> Option<&NonConvergenceWarning> {
        self.partition.warning.as_ref()
    }
}

/// Ingest `genomes`, seal, compute occurrence, partition, and annotate.
///
/// # Errors
///
/// Any error of the individual stages: invalid configuration, rejected or
/// duplicate genomes, an empty pangenome, or a degenerate partition model.
pub fn build_partitioned_graph(
    genomes: &[Genome],
    config: &PangenomeConfig,
) -> Result<PangenomeBuild> {
    config.validate()?;
    let model = PartitionModel::new(config.partition)?;

    let mut graph = NeighborJoinGraph::new(config.ingest);
    graph.ingest_genomes(genomes)?;
    graph.seal();
    log::info!("{}", graph.summary());

    let matrix = OccurrenceMatrix::compute(graph.registry())?;
    let partition = model.fit(&matrix)?;
    let graph = GraphAnnotator.annotate(graph, &partition)?;

    Ok(PangenomeBuild { graph, partition })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::PartitionLabel;
    use panpart_core::PanError;

    #[test]
    fn two_genomes() {
        let genomes = vec![
            Genome::from_families("g1", &["dnaA", "dnaN", "recF"], false),
            Genome::from_families("g2", &["dnaA", "dnaN", "recF", "phage"], false),
        ];
        let build = build_partitioned_graph(&genomes, &PangenomeConfig::default()).unwrap();
        assert_eq!(build.graph.label("dnaA").unwrap(), PartitionLabel::Persistent);
        assert_eq!(build.graph.label("phage").unwrap(), PartitionLabel::Shell);
        assert_eq!(build.graph.graph().edge_count(), 3);
        assert!(build.warning().is_none());
    }

    #[test]
    fn no_genomes() {
        let err = build_partitioned_graph(&[], &PangenomeConfig::default()).unwrap_err();
        assert!(matches!(err, PanError::EmptyInput(_)));
    }

    #[test]
    fn invalid_config() {
        let mut config = PangenomeConfig::default();
        config.partition.n_components = 0;
        assert!(matches!(
            build_partitioned_graph(&[], &config),
            Err(PanError::InvalidInput(_))
        ));
    }
}
