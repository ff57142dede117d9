//! Per-family presence across genomes.
//!
//! The matrix is a frozen snapshot of a sealed [`FamilyRegistry`]. Rows are
//! ordered by family name and columns by genome name, so the snapshot (and
//! everything fitted on it) is the same whatever order genomes were ingested in.

use std::collections::HashMap;

use panpart_core::{Annotated, PanError, PresenceBits, Result, Summarizable};

use crate::family::{FamilyId, FamilyRegistry};

/// One family's row of the matrix.
#[derive(Debug, Clone)]
pub struct OccurrenceRow {
    family: FamilyId,
    name: String,
    count: usize,
    frequency: f64,
    presence: PresenceBits,
    copies: Vec<usize>,
}

impl OccurrenceRow {
    pub fn family(&self) -> FamilyId {
        self.family
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of genomes containing the family.
    pub fn count(&self) -> usize {
        self.count
    }

    /// `count / total_genomes`, in `[0, 1]`.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Presence bit per genome column.
    pub fn presence(&self) -> &PresenceBits {
        &self.presence
    }

    /// Member-gene count per genome column.
    pub fn copies(&self) -> &[usize] {
        &self.copies
    }

    /// Number of genomes lacking the family.
    pub fn absent_count(&self) -> usize {
        self.presence.count_zeros()
    }
}

/// Family × genome occurrence snapshot.
#[derive(Debug, Clone)]
pub struct OccurrenceMatrix {
    genomes: Vec<String>,
    rows: Vec<OccurrenceRow>,
}

impl OccurrenceMatrix {
    /// Snapshot a sealed registry.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::NotSealed`] if the registry still accepts genomes.
    pub fn compute(registry: &FamilyRegistry) -> Result<Self> {
        if !registry.is_sealed() {
            return Err(PanError::NotSealed(
                "occurrence matrix requested before all genomes were ingested".into(),
            ));
        }

        // Column order: genome name. `column[genome_id]` maps handle → column.
        let mut genomes: Vec<(usize, &str)> = registry.genome_names().enumerate().collect();
        genomes.sort_by(|a, b| a.1.cmp(b.1));
        let mut column = vec![0usize; genomes.len()];
        for (col, &(idx, _)) in genomes.iter().enumerate() {
            column[idx] = col;
        }
        let n_genomes = genomes.len();

        let mut rows = Vec::with_capacity(registry.len());
        for fam in registry.families() {
            let mut presence = PresenceBits::zeros(n_genomes);
            let mut copies = vec![0usize; n_genomes];
            for genome in fam.genomes() {
                let col = column[genome.index()];
                presence.set(col)?;
                copies[col] = fam.copies_in(genome);
            }
            let count = fam.occurrence_count();
            rows.push(OccurrenceRow {
                family: fam.id(),
                name: fam.name().to_string(),
                count,
                frequency: count as f64 / n_genomes as f64,
                presence,
                copies,
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        log::debug!(
            "occurrence matrix: {} families × {} genomes",
            rows.len(),
            n_genomes
        );
        Ok(Self {
            genomes: genomes.into_iter().map(|(_, g)| g.to_string()).collect(),
            rows,
        })
    }

    /// Number of family rows.
    pub fn n_families(&self) -> usize {
        self.rows.len()
    }

    /// Number of genome columns.
    pub fn n_genomes(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows, ascending by family name.
    pub fn rows(&self) -> &[OccurrenceRow] {
        &self.rows
    }

    /// Genome names in column order.
    pub fn genome_names(&self) -> &[String] {
        &self.genomes
    }

    /// Row for a family name.
    ///
    /// # Errors
    ///
    /// Returns [`PanError::UnknownFamily`] if no row has this name.
    pub fn row(&self, family: &str) -> Result<&OccurrenceRow> {
        self.rows
            .binary_search_by(|r| r.name.as_str().cmp(family))
            .map(|i| &self.rows[i])
            .map_err(|_| PanError::UnknownFamily(family.to_string()))
    }

    /// Names of the genomes containing a family, in column order.
    pub fn genomes_of(&self, family: &str) -> Result<Vec<&str>> {
        let row = self.row(family)?;
        Ok(row
            .presence
            .iter_ones()
            .map(|col| self.genomes[col].as_str())
            .collect())
    }

    /// Number of genomes containing both families.
    pub fn co_occurrence(&self, a: &str, b: &str) -> Result<usize> {
        Ok(self.row(a)?.presence.intersection_count(&self.row(b)?.presence))
    }

    /// Frequencies in row order.
    pub fn frequencies(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.frequency).collect()
    }

    /// Occurrence counts in row order.
    pub fn counts(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.count).collect()
    }

    /// Genome name → column index.
    pub fn genome_index(&self) -> HashMap<&str, usize> {
        self.genomes
            .iter()
            .enumerate()
            .map(|(i, g)| (g.as_str(), i))
            .collect()
    }

    /// Family handle → row index.
    pub fn family_index(&self) -> HashMap<FamilyId, usize> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.family, i))
            .collect()
    }
}

impl Summarizable for OccurrenceMatrix {
    fn summary(&self) -> String {
        format!(
            "OccurrenceMatrix: {} families \u{00d7} {} genomes",
            self.n_families(),
            self.n_genomes()
        )
    }
}
