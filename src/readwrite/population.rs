use ndarray::{Array2, Ix2};
use std::path::Path;

use super::archive::{ArchiveReader, ArchiveWriter};
use super::tables::read_table;
use crate::core::AncestryMatrix;
use crate::errors::{HybridscanError, Result};

pub trait PopulationIO: Sized {
    fn read_archive(path: impl AsRef<Path>, n_chromosomes: usize) -> Result<Self>;
    fn write_archive(&self, path: impl AsRef<Path>) -> Result<()>;
}

impl PopulationIO for AncestryMatrix {
    /// Reads the genotype counts stored under `pop` with shape (3, loci).
    fn read_archive(path: impl AsRef<Path>, n_chromosomes: usize) -> Result<Self> {
        let mut reader = ArchiveReader::open(&path)?;
        let counts = reader.read_dim::<i32, Ix2>("pop")?;
        let matrix = AncestryMatrix::from_counts(counts.mapv(i64::from).view(), n_chromosomes)?;
        log::debug!(
            "Read {} loci of {} individuals from {}",
            matrix.n_loci(),
            matrix.n_individuals(),
            reader.get_path()
        );
        Ok(matrix)
    }

    fn write_archive(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = ArchiveWriter::create(path)?;
        let counts = self.get_counts();
        writer.write(
            "pop",
            counts.shape(),
            counts.iter().map(|&count| count as i32),
        )?;
        writer.finish()
    }
}

/// Store an integer CSV table under `pop` as int32.
pub fn compress_population(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let rows = read_table::<i32>(&input)?;
    let n_columns = rows.first().map_or(0, Vec::len);
    let counts = Array2::from_shape_vec(
        (rows.len(), n_columns),
        rows.into_iter().flatten().collect(),
    )
    .map_err(|e| HybridscanError::ReadError(format!("{e}")))?;

    let mut writer = ArchiveWriter::create(output)?;
    writer.write_array("pop", &counts)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn compress_and_read_population() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("pop.csv");
        std::fs::write(&csv, "1,0,4,1\n2,4,0,2\n1,0,0,1\n").unwrap();
        let archive = dir.path().join("pop.npz");
        compress_population(&csv, &archive).unwrap();

        let matrix = AncestryMatrix::read_archive(&archive, 2).unwrap();
        assert_eq!(matrix.n_individuals(), 4);
        assert_eq!(matrix.chromosome_length(), 2);
        assert_eq!(matrix.observed(1), [0., 4., 0.]);

        let copy = dir.path().join("copy.npz");
        matrix.write_archive(&copy).unwrap();
        assert_eq!(AncestryMatrix::read_archive(&copy, 2).unwrap(), matrix);
    }

    #[test]
    fn odd_locus_count_violates_divisibility() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("pop.csv");
        std::fs::write(&csv, "1,1,1\n2,2,2\n1,1,1\n").unwrap();
        let archive = dir.path().join("pop.npz");
        compress_population(&csv, &archive).unwrap();

        assert_eq!(
            AncestryMatrix::read_archive(&archive, 2),
            Err(HybridscanError::DivisibilityViolation {
                loci: 3,
                chromosomes: 2
            })
        );
    }

    #[test]
    fn population_must_be_int32() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("pop.npz");
        let mut writer = ArchiveWriter::create(&archive).unwrap();
        writer.write("pop", &[3, 1], [1.0f64, 2., 1.]).unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            AncestryMatrix::read_archive(&archive, 1),
            Err(HybridscanError::IncompatibleArchiveSchema { .. })
        ));
    }
}
