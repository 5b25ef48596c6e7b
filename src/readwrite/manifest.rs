//! Replicate manifests.
//!
//! A manifest is a headerless CSV with one row per simulated replicate. Only the seed,
//! the file paths and the chromosome count are used downstream; the remaining columns
//! describe how the replicate was simulated.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::{HybridscanError, Result};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ReplicateRecord {
    pub seed: i64,
    pub population_path: String,
    pub individual_path: String,
    pub saved_individuals: String,
    pub fitness_path: String,
    pub position_path: String,
    pub population_size: usize,
    pub survivors: usize,
    pub chromosome_length: usize,
    pub chromosome_count: usize,
    pub incompatibility_pairs: usize,
    pub intra_probability: f64,
    pub genotype_decay: f64,
}

impl ReplicateRecord {
    /// The population counts are read from the `.npz` next to the simulator's output.
    pub fn population_archive(&self) -> PathBuf {
        Path::new(&self.population_path).with_extension("npz")
    }
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<ReplicateRecord>> {
    let source = path.as_ref().display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(|e| HybridscanError::ReadError(format!("Failed to read {source}: {e}")))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(index, record)| {
            let record: ReplicateRecord = record
                .map_err(|e| HybridscanError::malformed(&source, index + 1, format!("{e}")))?;
            if record.chromosome_count == 0 {
                return Err(HybridscanError::malformed(
                    &source,
                    index + 1,
                    "chromosome count must be positive",
                ));
            }
            Ok(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ROW: &str = "17,out/pop_17.csv,out/ind_17.txt,True,out/fit_17.csv,out/pos_17.csv,1000,812,1000,2,1,0.5,0.9\n";

    #[test]
    fn read_manifest_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(&path, ROW.repeat(2)).unwrap();

        let records = read_manifest(&path).unwrap();
        assert_eq!(records.len(), 2);
        let record = &records[0];
        assert_eq!(record.seed, 17);
        assert_eq!(record.chromosome_count, 2);
        assert_eq!(record.fitness_path, "out/fit_17.csv");
        assert_eq!(record.population_archive(), PathBuf::from("out/pop_17.npz"));
        assert_eq!(record.genotype_decay, 0.9);
    }

    #[test]
    fn short_row_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(&path, format!("{ROW}1,2,3\n")).unwrap();
        assert!(matches!(
            read_manifest(&path),
            Err(HybridscanError::MalformedInputRow { row: 2, .. })
        ));
    }

    #[test]
    fn zero_chromosomes_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        std::fs::write(&path, ROW.replace(",1000,2,", ",1000,0,")).unwrap();
        assert!(matches!(
            read_manifest(&path),
            Err(HybridscanError::MalformedInputRow { row: 1, .. })
        ));
    }
}
