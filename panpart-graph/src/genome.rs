//! Genome input model: ordered gene-family sequences per contig.
//!
//! Genomes arrive already annotated and clustered: each gene is reduced to the
//! identifier of its gene family plus strand and position. Gene order within
//! a contig is the order of [`Contig::genes`].

use core::fmt;

use panpart_core::Annotated;

/// Strand orientation of a gene on its contig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    /// Returns `true` if this is the forward (+) strand.
    pub fn is_forward(&self) -> bool {
        matches!(self, Strand::Forward)
    }

    /// Returns `true` if this is the reverse (-) strand.
    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// Parse a GFF-style strand symbol (`+`, `-`, anything else is unknown).
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// One gene, reduced to its family assignment and location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneOccurrence {
    /// Gene family identifier assigned by the clustering step.
    pub family: String,
    pub strand: Strand,
    /// Position of the gene on its contig (start coordinate or ordinal).
    pub position: u64,
}

impl GeneOccurrence {
    pub fn new(family: impl Into<String>, strand: Strand, position: u64) -> Self {
        Self {
            family: family.into(),
            strand,
            position,
        }
    }
}

/// An ordered run of genes on one replicon.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contig {
    pub name: String,
    /// Circular contigs link their last gene back to the first.
    pub circular: bool,
    pub genes: Vec<GeneOccurrence>,
}

impl Contig {
    /// An empty contig.
    pub fn new(name: impl Into<String>, circular: bool) -> Self {
        Self {
            name: name.into(),
            circular,
            genes: Vec::new(),
        }
    }

    /// Append a gene at the end of the contig.
    pub fn push(&mut self, gene: GeneOccurrence) {
        self.genes.push(gene);
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the contig has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

/// A genome: an identifier and its contigs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Genome {
    pub id: String,
    pub contigs: Vec<Contig>,
}

impl Genome {
    /// A genome with no contigs.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contigs: Vec::new(),
        }
    }

    /// Builder-style contig addition.
    pub fn with_contig(mut self, contig: Contig) -> Self {
        self.contigs.push(contig);
        self
    }

    /// Single-contig genome from a list of family identifiers.
    ///
    /// Genes are placed on the forward strand at ordinal positions `0, 1, …`.
    pub fn from_families(id: impl Into<String>, families: &[&str], circular: bool) -> Self {
        let id = id.into();
        let mut contig = Contig::new(format!("{}_contig_1", id), circular);
        for (i, fam) in families.iter().enumerate() {
            contig.push(GeneOccurrence::new(*fam, Strand::Forward, i as u64));
        }
        Self {
            id,
            contigs: vec![contig],
        }
    }

    /// Total number of genes across all contigs.
    pub fn gene_count(&self) -> usize {
        self.contigs.iter().map(Contig::len).sum()
    }

    /// Whether the genome carries no genes at all.
    pub fn is_empty(&self) -> bool {
        self.gene_count() == 0
    }

    /// Family identifiers of every gene, contig by contig.
    pub fn families(&self) -> impl Iterator<Item = &str> + '_ {
        self.contigs
            .iter()
            .flat_map(|c| c.genes.iter().map(|g| g.family.as_str()))
    }
}

impl Annotated for Genome {
    fn name(&self) -> &str {
        &self.id
    }
}
