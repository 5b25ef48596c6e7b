//! Batching of feature archives for model training.
//!
//! Training code reads archives in fixed-size batches and rescales the raw pair distance
//! into one of four encodings. Both are checked here, before any training starts.

use ndarray::Ix1;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

use crate::core::UNLINKED;
use crate::errors::{HybridscanError, Result};
use crate::readwrite::ArchiveReader;

pub static DISTANCE_ENCODINGS: phf::Map<&'static str, DistanceEncoding> = phf_map! {
    "inc1" => DistanceEncoding::Inc1,
    "inc10" => DistanceEncoding::Inc10,
    "dec0" => DistanceEncoding::Dec0,
    "dec-1" => DistanceEncoding::DecMinus1,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceEncoding {
    /// Increasing with distance, unlinked is 1.
    #[serde(rename = "inc1")]
    Inc1,
    /// Increasing with distance, unlinked is 10.
    #[serde(rename = "inc10")]
    Inc10,
    /// Decreasing with distance, unlinked is 0.
    #[serde(rename = "dec0")]
    Dec0,
    /// Decreasing with distance, unlinked is -1.
    #[serde(rename = "dec-1")]
    DecMinus1,
}

impl DistanceEncoding {
    pub fn from_name(name: &str) -> Result<Self> {
        DISTANCE_ENCODINGS.get(name).copied().ok_or_else(|| {
            let mut known: Vec<&str> = DISTANCE_ENCODINGS.keys().copied().collect();
            known.sort_unstable();
            HybridscanError::InvalidSetting(format!(
                "Unknown distance encoding {name}, expected one of {}",
                known.join(", ")
            ))
        })
    }

    /// Rescale a raw distance, `scale` being the chromosome length.
    pub fn encode(&self, distance: i32, scale: f64) -> f64 {
        let unlinked = distance == UNLINKED;
        let relative = distance as f64 / scale;
        match (self, unlinked) {
            (DistanceEncoding::Inc1, true) => 1.,
            (DistanceEncoding::Inc10, true) => 10.,
            (DistanceEncoding::Dec0, true) => 0.,
            (DistanceEncoding::DecMinus1, true) => -1.,
            (DistanceEncoding::Inc1 | DistanceEncoding::Inc10, false) => relative,
            (DistanceEncoding::Dec0 | DistanceEncoding::DecMinus1, false) => 1. - relative,
        }
    }

    pub fn encode_all(&self, distances: &[i32], scale: f64) -> Vec<f64> {
        distances
            .iter()
            .map(|&distance| self.encode(distance, scale))
            .collect()
    }
}

/// Partition of a file's samples into equally sized batches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    pub batch_size: usize,
    pub samples_per_file: usize,
    pub batches_per_file: usize,
}

impl BatchPlan {
    pub fn new(batch_size: usize, samples_per_file: usize) -> Result<Self> {
        if batch_size == 0 || samples_per_file % batch_size != 0 {
            return Err(HybridscanError::BatchSizeMismatch {
                batch_size,
                samples: samples_per_file,
            });
        }
        Ok(Self {
            batch_size,
            samples_per_file,
            batches_per_file: samples_per_file / batch_size,
        })
    }

    pub fn n_batches(&self, n_files: usize) -> usize {
        self.batches_per_file * n_files
    }

    /// File index and sample range of a global batch index.
    pub fn locate(&self, index: usize) -> (usize, Range<usize>) {
        let file = index / self.batches_per_file;
        let batch = index % self.batches_per_file;
        let start = batch * self.batch_size;
        (file, start..start + self.batch_size)
    }

    /// File index and sample range of every batch over `n_files` files.
    pub fn batches(&self, n_files: usize) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.n_batches(n_files)).map(|index| self.locate(index))
    }
}

/// What a training run would see of one feature archive.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveSummary {
    pub samples: usize,
    pub ragged: bool,
    pub plan: BatchPlan,
    /// Rescaled distances of pair archives.
    pub distances: Option<Vec<f64>>,
    pub unlinked: usize,
}

/// Count the samples of an archive and check them against the batch size.
///
/// Pair archives carry one label per sample in `y`; feature archives without `d` are
/// counted by the rows of `meta`.
pub fn inspect_archive(
    path: impl AsRef<Path>,
    batch_size: usize,
    encoding: DistanceEncoding,
    scale: f64,
) -> Result<ArchiveSummary> {
    let mut reader = ArchiveReader::open(path)?;
    let samples = reader
        .read::<i64>("meta")?
        .shape()
        .first()
        .copied()
        .unwrap_or(0);
    let plan = BatchPlan::new(batch_size, samples)?;
    let raw = match reader.contains("d") {
        true => Some(reader.read_dim::<i32, Ix1>("d")?.to_vec()),
        false => None,
    };
    Ok(ArchiveSummary {
        samples,
        ragged: reader.contains("breaks"),
        plan,
        distances: raw.as_ref().map(|d| encoding.encode_all(d, scale)),
        unlinked: raw.map_or(0, |d| d.iter().filter(|&&x| x == UNLINKED).count()),
    })
}

/// Inspect every archive of a training run. All archives must split into the same batches.
pub fn inspect_archives<P: AsRef<Path>>(
    paths: &[P],
    batch_size: usize,
    encoding: DistanceEncoding,
    scale: f64,
) -> Result<Vec<ArchiveSummary>> {
    let mut summaries: Vec<ArchiveSummary> = Vec::with_capacity(paths.len());
    for path in paths {
        let summary = inspect_archive(path, batch_size, encoding, scale)?;
        if let Some(first) = summaries.first() {
            if summary.samples != first.samples {
                return Err(HybridscanError::schema(
                    &path.as_ref().display().to_string(),
                    format!(
                        "holds {} samples, other archives hold {}",
                        summary.samples, first.samples
                    ),
                ));
            }
        }
        summaries.push(summary);
    }
    Ok(summaries)
}
