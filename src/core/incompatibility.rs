//! Incompatibilities placed by the simulator and the metadata derived from them.

use smallvec::SmallVec;

use super::locus::Locus;

/// One incompatibility: the loci that take part in it and the fitness of every genotype
/// class of the interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Incompatibility {
    positions: SmallVec<[usize; 2]>,
    fitness: Vec<f64>,
}

/// Metadata of one locus of a true incompatibility.
#[derive(Clone, Debug, PartialEq)]
pub struct IncompatibilityRecord {
    pub seed: i64,
    pub sample_size: u64,
    pub selection: f64,
    pub genotypes: u32,
    pub locus_index: usize,
    pub locus: Locus,
    pub partners: SmallVec<[Locus; 2]>,
}

impl Incompatibility {
    pub fn new(positions: impl IntoIterator<Item = usize>, fitness: Vec<f64>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
            fitness,
        }
    }

    pub fn get_positions(&self) -> &[usize] {
        &self.positions
    }

    /// Lowest fitness over all genotype classes.
    pub fn selection(&self) -> f64 {
        self.fitness.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Height of the signal peak placed at every locus of the incompatibility.
    pub fn peak_height(&self) -> f64 {
        1. - self.selection()
    }

    /// Bit `j` is set when genotype class `j` has reduced fitness.
    pub fn genotype_mask(&self) -> u32 {
        self.fitness
            .iter()
            .enumerate()
            .filter(|(_, fitness)| **fitness < 1.)
            .fold(0, |mask, (j, _)| mask | (1 << j))
    }

    pub fn loci(&self, chromosome_length: usize) -> impl Iterator<Item = Locus> + '_ {
        self.positions
            .iter()
            .map(move |&position| Locus::from_global(position, chromosome_length))
    }

    /// One record per locus, each listing the remaining loci as partners.
    pub fn records(
        &self,
        seed: i64,
        sample_size: u64,
        chromosome_length: usize,
    ) -> Vec<IncompatibilityRecord> {
        let selection = self.selection();
        let genotypes = self.genotype_mask();
        self.positions
            .iter()
            .enumerate()
            .map(|(locus_index, &position)| IncompatibilityRecord {
                seed,
                sample_size,
                selection,
                genotypes,
                locus_index,
                locus: Locus::from_global(position, chromosome_length),
                partners: self
                    .positions
                    .iter()
                    .filter(|&&partner| partner != position)
                    .map(|&partner| Locus::from_global(partner, chromosome_length))
                    .collect(),
            })
            .collect()
    }
}

impl IncompatibilityRecord {
    /// Fields in log column order.
    pub fn to_fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.seed.to_string(),
            self.sample_size.to_string(),
            format!("{:.6}", self.selection),
            self.genotypes.to_string(),
            self.locus_index.to_string(),
            self.locus.chromosome.to_string(),
            self.locus.position.to_string(),
        ];
        fields.extend(self.partners.iter().map(|p| p.chromosome.to_string()));
        fields.extend(self.partners.iter().map(|p| p.position.to_string()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_marks_reduced_genotypes() {
        let incompatibility = Incompatibility::new([10, 20], vec![1., 1., 0.7, 1., 0.3]);
        assert_eq!(incompatibility.genotype_mask(), 0b10100);
        assert_eq!(incompatibility.selection(), 0.3);
        assert!((incompatibility.peak_height() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn records_for_unlinked_pair() {
        let incompatibility = Incompatibility::new([500, 1500], vec![1., 1., 0.3]);
        let records = incompatibility.records(7, 4, 1000);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.seed, 7);
        assert_eq!(first.sample_size, 4);
        assert_eq!(first.selection, 0.3);
        assert_eq!(first.genotypes, 0b100);
        assert_eq!(first.locus_index, 0);
        assert_eq!(first.locus, Locus::new(0, 500));
        assert_eq!(first.partners.as_slice(), &[Locus::new(1, 500)]);

        let second = &records[1];
        assert_eq!(second.locus_index, 1);
        assert_eq!(second.locus, Locus::new(1, 500));
        assert_eq!(second.partners.as_slice(), &[Locus::new(0, 500)]);
    }

    #[test]
    fn record_fields_follow_log_layout() {
        let incompatibility = Incompatibility::new([500, 1500], vec![1., 1., 0.3]);
        let fields = incompatibility.records(7, 4, 1000)[0].to_fields();
        assert_eq!(
            fields,
            ["7", "4", "0.300000", "4", "0", "0", "500", "1", "500"]
        );
    }
}
