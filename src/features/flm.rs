//! Per-chromosome population features.
//!
//! Every chromosome of every replicate becomes one row of the archive: the locus-wise
//! ancestry summary as input, the propagated signal track as target and the
//! chi-squared statistic for evaluation.

use ndarray::Array2;
use std::path::Path;

use crate::config::Settings;
use crate::core::{AncestryMatrix, Incompatibility, IncompatibilityRecord};
use crate::errors::{HybridscanError, Result};
use crate::readwrite::{ArchiveWriter, PopulationIO, ReplicateRecord, read_incompatibilities};
use crate::stats::{Expectation, LocusDistortion, SignalTrack};

/// Number of summary columns per locus: mean ancestry, homo1, het, homo2.
pub const FLM_FEATURES: usize = 4;

/// Significance level of the per-replicate distortion summary in the log.
const SIGNIFICANCE: f64 = 0.05;

#[derive(Clone, Debug, PartialEq)]
pub struct FlmReplicate {
    pub seed: i64,
    pub features: Vec<Array2<f64>>,
    pub signal: SignalTrack,
    pub chi_squared: Vec<f64>,
    pub records: Vec<IncompatibilityRecord>,
    pub chromosome_length: usize,
}

impl FlmReplicate {
    pub fn build(
        seed: i64,
        matrix: &AncestryMatrix,
        incompatibilities: &[Incompatibility],
        settings: &Settings,
    ) -> Result<Self> {
        let chromosome_length = matrix.chromosome_length();
        let signal = SignalTrack::build(
            incompatibilities,
            chromosome_length,
            matrix.n_chromosomes(),
            settings.bin_width,
            settings.peak_decay,
        )?;
        let records: Vec<IncompatibilityRecord> = incompatibilities
            .iter()
            .flat_map(|incompatibility| {
                incompatibility.records(seed, matrix.n_individuals(), chromosome_length)
            })
            .collect();

        let true_loci: Vec<usize> = incompatibilities
            .iter()
            .flat_map(|incompatibility| incompatibility.get_positions().iter().copied())
            .collect();
        let summaries = matrix.summaries(Expectation::HardyWeinberg, &true_loci);
        log::debug!(
            "Replicate {seed}: {} distorted loci, {} of {} incompatibility loci",
            summaries
                .iter()
                .filter(|s| s.is_distorted(SIGNIFICANCE))
                .count(),
            summaries
                .iter()
                .filter(|s| s.incompatible && s.is_distorted(SIGNIFICANCE))
                .count(),
            true_loci.len()
        );

        Ok(Self {
            seed,
            features: matrix.chromosome_features(),
            signal,
            chi_squared: summaries
                .iter()
                .map(|summary| summary.chi_squared)
                .collect(),
            records,
            chromosome_length,
        })
    }

    /// Load the population archive and incompatibility tables of one manifest row.
    pub fn load(record: &ReplicateRecord, settings: &Settings) -> Result<Self> {
        let matrix =
            AncestryMatrix::read_archive(record.population_archive(), record.chromosome_count)?;
        let incompatibilities =
            read_incompatibilities(&record.fitness_path, &record.position_path)?;
        log::debug!(
            "Replicate {}: {} individuals, {} incompatibilities",
            record.seed,
            matrix.n_individuals(),
            incompatibilities.len()
        );
        Self::build(record.seed, &matrix, &incompatibilities, settings)
    }

    pub fn n_chromosomes(&self) -> usize {
        self.features.len()
    }
}

/// Accumulates replicates into the row-major arrays of one archive.
#[derive(Debug, Default)]
pub struct FlmArchive {
    x: Vec<f64>,
    y: Vec<f64>,
    chi: Vec<f64>,
    meta: Vec<i64>,
    rows: usize,
    chromosome_length: Option<usize>,
    bins: Option<usize>,
}

impl FlmArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn push(&mut self, replicate: &FlmReplicate) -> Result<()> {
        let bins = replicate.signal.get_bins().len() / replicate.n_chromosomes().max(1);
        for (name, stored, found) in [
            (
                "chromosome length",
                &mut self.chromosome_length,
                replicate.chromosome_length,
            ),
            ("signal bins", &mut self.bins, bins),
        ] {
            match *stored {
                Some(expected) if expected != found => {
                    return Err(HybridscanError::ReadError(format!(
                        "Replicate {} has {name} {found}, earlier replicates have {expected}",
                        replicate.seed
                    )));
                }
                _ => *stored = Some(found),
            }
        }

        for (chromosome, ((features, signal), chi)) in replicate
            .features
            .iter()
            .zip(replicate.signal.chromosomes())
            .zip(replicate.chi_squared.chunks(replicate.chromosome_length))
            .enumerate()
        {
            self.x.extend(features.iter());
            self.y.extend_from_slice(signal);
            self.chi.extend_from_slice(chi);
            self.meta.extend([replicate.seed, chromosome as i64]);
            self.rows += 1;
        }
        Ok(())
    }

    pub fn write(self, path: impl AsRef<Path>) -> Result<()> {
        let length = self.chromosome_length.unwrap_or(0);
        let bins = self.bins.unwrap_or(0);
        let mut writer = ArchiveWriter::create(path)?;
        writer.write("x", &[self.rows, length, FLM_FEATURES], self.x)?;
        writer.write("y", &[self.rows, bins], self.y)?;
        writer.write("chi", &[self.rows, length], self.chi)?;
        writer.write("meta", &[self.rows, 2], self.meta)?;
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readwrite::ArchiveReader;
    use ndarray::{Array3, Ix2, Ix3};
    use tempfile::tempdir;

    /// Four individuals in 1:2:1 proportions at every locus.
    fn mendelian_matrix(n_loci: usize, n_chromosomes: usize) -> AncestryMatrix {
        let mut counts = Array2::<i64>::zeros((3, n_loci));
        counts.row_mut(0).fill(1);
        counts.row_mut(1).fill(2);
        counts.row_mut(2).fill(1);
        AncestryMatrix::from_counts(counts.view(), n_chromosomes).unwrap()
    }

    #[test]
    fn replicate_rows_per_chromosome() {
        let matrix = mendelian_matrix(2000, 2);
        let incompatibilities = vec![Incompatibility::new([500, 1500], vec![1., 1., 0.3])];
        let replicate =
            FlmReplicate::build(7, &matrix, &incompatibilities, &Settings::default()).unwrap();

        assert_eq!(replicate.n_chromosomes(), 2);
        assert_eq!(replicate.features[0].dim(), (1000, 4));
        assert_eq!(replicate.features[1][[0, 0]], 0.5);
        assert!(replicate.chi_squared.iter().all(|x| x.abs() < 1e-9));
        assert_eq!(replicate.records.len(), 2);

        let peaks: Vec<f64> = replicate
            .signal
            .chromosomes()
            .map(|bins| bins[50])
            .collect();
        assert_eq!(peaks, vec![0.7, 0.7]);
    }

    #[test]
    fn write_archive_shapes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flm.npz");
        let matrix = mendelian_matrix(200, 2);
        let settings = Settings::default();

        let mut archive = FlmArchive::new();
        for seed in [1, 2] {
            let incompatibilities = vec![Incompatibility::new([15, 120], vec![0.5, 1., 1.])];
            let replicate =
                FlmReplicate::build(seed, &matrix, &incompatibilities, &settings).unwrap();
            archive.push(&replicate).unwrap();
        }
        assert_eq!(archive.n_rows(), 4);
        archive.write(&path).unwrap();

        let mut reader = ArchiveReader::open(&path).unwrap();
        let x: Array3<f64> = reader.read_dim::<f64, Ix3>("x").unwrap();
        assert_eq!(x.dim(), (4, 100, 4));
        let y = reader.read_dim::<f64, Ix2>("y").unwrap();
        assert_eq!(y.dim(), (4, 10));
        assert_eq!(y[[0, 1]], 0.5);
        assert_eq!(y[[1, 2]], 0.5);
        let chi = reader.read_dim::<f64, Ix2>("chi").unwrap();
        assert_eq!(chi.dim(), (4, 100));
        let meta = reader.read_dim::<i64, Ix2>("meta").unwrap();
        assert_eq!(meta.row(3).to_vec(), vec![2, 1]);
    }

    #[test]
    fn mixed_chromosome_lengths_are_rejected() {
        let settings = Settings::default();
        let mut archive = FlmArchive::new();
        let first = FlmReplicate::build(1, &mendelian_matrix(200, 2), &[], &settings).unwrap();
        let second = FlmReplicate::build(2, &mendelian_matrix(300, 2), &[], &settings).unwrap();
        archive.push(&first).unwrap();
        assert!(archive.push(&second).is_err());
    }
}
