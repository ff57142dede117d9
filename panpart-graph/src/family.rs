//! Gene-family registry, the owner of every family and its occurrences.
//!
//! Families and genomes are interned on first sight and addressed afterwards by
//! dense, stable handles ([`FamilyId`], [`GenomeId`]). Presence is tracked as a
//! per-family set of genomes, so recording the same (family, genome) pair twice
//! never inflates a family's occurrence count.

use std::collections::{BTreeMap, HashMap};

use panpart_core::{Annotated, PanError, Result};

use crate::genome::Strand;

/// Handle of a gene family inside a [`FamilyRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FamilyId(u32);

impl FamilyId {
    /// Dense index of the family (registration order).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a genome inside a [`FamilyRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenomeId(u32);

impl GenomeId {
    /// Dense index of the genome (registration order).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One member gene of a family.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberGene {
    pub genome: GenomeId,
    pub contig: String,
    pub position: u64,
    pub strand: Strand,
}

/// A gene family and its cross-genome occurrences.
#[derive(Debug, Clone)]
pub struct GeneFamily {
    id: FamilyId,
    name: String,
    representative_length: Option<u64>,
    /// Genome → number of member genes recorded in it.
    copies: BTreeMap<GenomeId, usize>,
    members: Vec<MemberGene>,
}

impl GeneFamily {
    fn new(id: FamilyId, name: String) -> Self {
        Self {
            id,
            name,
            representative_length: None,
            copies: BTreeMap::new(),
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> FamilyId {
        self.id
    }

    /// Length of the family's representative gene, if known.
    pub fn representative_length(&self) -> Option<u64> {
        self.representative_length
    }

    /// Number of distinct genomes containing at least one member.
    pub fn occurrence_count(&self) -> usize {
        self.copies.len()
    }

    /// Genomes containing the family, ascending by handle.
    pub fn genomes(&self) -> impl Iterator<Item = GenomeId> + '_ {
        self.copies.keys().copied()
    }

    /// Whether the family occurs in `genome`.
    pub fn is_in(&self, genome: GenomeId) -> bool {
        self.copies.contains_key(&genome)
    }

    /// Number of member genes recorded in `genome`.
    pub fn copies_in(&self, genome: GenomeId) -> usize {
        self.copies.get(&genome).copied().unwrap_or(0)
    }

    /// Member genes. Sorted by genome, contig, and position once sealed.
    pub fn members(&self) -> &[MemberGene] {
        &self.members
    }

    /// Number of genomes holding more than one member gene.
    pub fn multicopy_genomes(&self) -> usize {
        self.copies.values().filter(|&&c| c > 1).count()
    }
}

impl Annotated for GeneFamily {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Owner of all gene families and genomes of one pangenome.
#[derive(Debug, Clone, Default)]
pub struct FamilyRegistry {
    families: Vec<GeneFamily>,
    family_index: HashMap<String, FamilyId>,
    genomes: Vec<String>,
    genome_index: HashMap<String, GenomeId>,
    sealed: bool,
}

impl FamilyRegistry {
    /// An empty, unsealed registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `family` occurs in `genome`, creating either on first use.
    ///
    /// Idempotent per (family, genome) pair.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::Sealed`] once the registry is sealed.
    pub fn register_occurrence(&mut self, family: &str, genome: &str) -> Result<FamilyId> {
        self.register(family, genome).map(|(family_id, _)| family_id)
    }

    /// Record one member gene of `family` located in `genome`.
    ///
    /// Registers the occurrence and increments the family's copy count in
    /// that genome.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::Sealed`] once the registry is sealed.
    pub fn record_gene(
        &mut self,
        family: &str,
        genome: &str,
        contig: &str,
        position: u64,
        strand: Strand,
    ) -> Result<FamilyId> {
        let (family_id, genome_id) = self.register(family, genome)?;
        let fam = &mut self.families[family_id.index()];
        *fam.copies.entry(genome_id).or_insert(0) += 1;
        fam.members.push(MemberGene {
            genome: genome_id,
            contig: contig.to_string(),
            position,
            strand,
        });
        Ok(family_id)
    }

    /// Record the representative gene length of an already-registered family.
    ///
    /// # Errors
    ///
    /// [`PanError::UnknownFamily`] if the family was never registered,
    /// [`PanError::Sealed`] once the registry is sealed.
    pub fn set_representative_length(&mut self, family: &str, length: u64) -> Result<()> {
        self.ensure_unsealed("set_representative_length")?;
        let id = self.id_of(family)?;
        self.families[id.index()].representative_length = Some(length);
        Ok(())
    }

    /// Number of distinct genomes containing `family`.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family was never registered.
    pub fn occurrence_count(&self, family: &str) -> Result<usize> {
        Ok(self.family(family)?.occurrence_count())
    }

    /// Number of distinct genomes ever registered.
    pub fn total_genomes(&self) -> usize {
        self.genomes.len()
    }

    /// Look up a family by name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family was never registered.
    pub fn family(&self, name: &str) -> Result<&GeneFamily> {
        let id = self.id_of(name)?;
        Ok(&self.families[id.index()])
    }

    /// Handle of a family by name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if the family was never registered.
    pub fn id_of(&self, name: &str) -> Result<FamilyId> {
        self.family_index
            .get(name)
            .copied()
            .ok_or_else(|| PanError::UnknownFamily(name.to_string()))
    }

    /// Family behind a handle.
    pub fn get(&self, id: FamilyId) -> Option<&GeneFamily> {
        self.families.get(id.index())
    }

    /// All families in registration order.
    pub fn families(&self) -> impl Iterator<Item = &GeneFamily> + '_ {
        self.families.iter()
    }

    /// Number of families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether no family has been registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Handle of a genome by name, if registered.
    pub fn genome_id(&self, name: &str) -> Option<GenomeId> {
        self.genome_index.get(name).copied()
    }

    /// Name behind a genome handle.
    pub fn genome_name(&self, id: GenomeId) -> Option<&str> {
        self.genomes.get(id.index()).map(String::as_str)
    }

    /// All genome names in registration order.
    pub fn genome_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.genomes.iter().map(String::as_str)
    }

    /// Whether a genome has been registered.
    pub fn contains_genome(&self, name: &str) -> bool {
        self.genome_index.contains_key(name)
    }

    /// Freeze the registry. Occurrence counts no longer change after this.
    ///
    /// Member lists are put in canonical order (genome name, contig,
    /// position) so the sealed state does not depend on ingestion order.
    pub fn seal(&mut self) {
        if self.sealed {
            return;
        }
        let genomes = &self.genomes;
        for fam in &mut self.families {
            fam.members.sort_by(|a, b| {
                genomes[a.genome.index()]
                    .cmp(&genomes[b.genome.index()])
                    .then_with(|| a.contig.cmp(&b.contig))
                    .then_with(|| a.position.cmp(&b.position))
            });
        }
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub(crate) fn ensure_unsealed(&self, operation: &str) -> Result<()> {
        if self.sealed {
            return Err(PanError::Sealed(format!(
                "{} called after the pangenome was sealed",
                operation
            )));
        }
        Ok(())
    }

    fn register(&mut self, family: &str, genome: &str) -> Result<(FamilyId, GenomeId)> {
        self.ensure_unsealed("register_occurrence")?;
        let genome_id = self.intern_genome(genome);
        let family_id = self.intern_family(family);
        self.families[family_id.index()]
            .copies
            .entry(genome_id)
            .or_insert(0);
        Ok((family_id, genome_id))
    }

    fn intern_family(&mut self, name: &str) -> FamilyId {
        if let Some(&id) = self.family_index.get(name) {
            return id;
        }
        let id = FamilyId(self.families.len() as u32);
        self.families.push(GeneFamily::new(id, name.to_string()));
        self.family_index.insert(name.to_string(), id);
        id
    }

    fn intern_genome(&mut self, name: &str) -> GenomeId {
        if let Some(&id) = self.genome_index.get(name) {
            return id;
        }
        let id = GenomeId(self.genomes.len() as u32);
        self.genomes.push(name.to_string());
        self.genome_index.insert(name.to_string(), id);
        id
    }
}
