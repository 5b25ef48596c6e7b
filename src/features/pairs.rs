//! Locus-pair training examples.
//!
//! Each replicate contributes every true incompatibility pair and as many false pairs.
//! The archive layout depends on the sampling mode: fixed-width examples stack into a
//! cube, ragged examples are concatenated and delimited by `breaks`.

use derive_more::{Deref, DerefMut};
use ndarray::ArrayView2;
use rand::Rng;
use std::path::Path;

use crate::config::Settings;
use crate::core::{AncestryMatrix, CompressedHaplotypes, PAIR_FEATURES, PairExample};
use crate::errors::{HybridscanError, Result};
use crate::readwrite::{ArchiveWriter, HaplotypeIO, ReplicateRecord, read_pair_positions};
use crate::sampling::{LocusSelector, PairSampler, SampleMode};

/// Build the examples of one replicate from its genotype codes.
pub fn replicate_examples<R: Rng + ?Sized>(
    seed: i64,
    codes: ArrayView2<u8>,
    n_chromosomes: usize,
    incompatibilities: &[[usize; 2]],
    settings: &Settings,
    mode: SampleMode,
    rng: &mut R,
) -> Result<Vec<PairExample>> {
    let n_loci = codes.ncols();
    if n_chromosomes == 0 || n_loci % n_chromosomes != 0 {
        return Err(HybridscanError::DivisibilityViolation {
            loci: n_loci,
            chromosomes: n_chromosomes,
        });
    }
    let matrix = AncestryMatrix::from_genotypes(codes, n_chromosomes)?;
    let true_loci: Vec<usize> = incompatibilities.iter().flatten().copied().collect();
    let false_loci = LocusSelector::new(settings).select(&matrix, &true_loci, rng)?;

    PairSampler::new(mode).sample(
        seed,
        codes,
        matrix.chromosome_length(),
        incompatibilities,
        &false_loci,
        rng,
    )
}

/// Load the individual archive and positions of one manifest row.
pub fn load_replicate<R: Rng + ?Sized>(
    record: &ReplicateRecord,
    settings: &Settings,
    mode: SampleMode,
    rng: &mut R,
) -> Result<Vec<PairExample>> {
    let codes = CompressedHaplotypes::read_archive(&record.individual_path)?.decompress()?;
    let incompatibilities = read_pair_positions(&record.position_path)?;
    log::debug!(
        "Replicate {}: {} individuals, {} incompatibility pairs",
        record.seed,
        codes.nrows(),
        incompatibilities.len()
    );
    replicate_examples(
        record.seed,
        codes.view(),
        record.chromosome_count,
        &incompatibilities,
        settings,
        mode,
        rng,
    )
}

/// All examples of a run, written as one archive.
#[derive(Debug, Deref, DerefMut)]
pub struct PairArchive {
    mode: SampleMode,
    #[deref]
    #[deref_mut]
    examples: Vec<PairExample>,
}

impl PairArchive {
    pub fn new(mode: SampleMode) -> Self {
        Self {
            mode,
            examples: Vec::new(),
        }
    }

    /// Cumulative individual counts, starting at zero.
    pub fn breaks(&self) -> Vec<i64> {
        std::iter::once(0)
            .chain(self.examples.iter().scan(0i64, |total, example| {
                *total += example.n_individuals() as i64;
                Some(*total)
            }))
            .collect()
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let n_examples = self.examples.len();
        let genotypes = self
            .examples
            .iter()
            .flat_map(|example| example.genotypes.iter().copied());

        if let SampleMode::Fixed(target) = self.mode {
            if let Some(example) = self.examples.iter().find(|e| e.n_individuals() != target) {
                return Err(HybridscanError::WriteError(format!(
                    "Example of replicate {} holds {} individuals instead of {target}",
                    example.seed,
                    example.n_individuals()
                )));
            }
        }

        let mut writer = ArchiveWriter::create(path)?;
        match self.mode {
            SampleMode::Fixed(target) => {
                writer.write("x", &[n_examples, target, PAIR_FEATURES], genotypes)?;
            }
            SampleMode::Ragged => {
                let breaks = self.breaks();
                let total = breaks.last().copied().unwrap_or(0) as usize;
                writer.write("x", &[total, PAIR_FEATURES], genotypes)?;
                writer.write("breaks", &[breaks.len()], breaks)?;
            }
        }
        writer.write(
            "y",
            &[n_examples],
            self.examples.iter().map(|e| e.pair.label),
        )?;
        writer.write("d", &[n_examples], self.examples.iter().map(|e| e.distance))?;
        writer.write(
            "meta",
            &[n_examples, 3],
            self.examples.iter().flat_map(PairExample::meta),
        )?;
        writer.finish()
    }
}
