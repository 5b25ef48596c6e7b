//! Run-length representation of per-individual ancestry
//!
//! An individual's ancestry is constant over long contiguous stretches of its
//! genome. `CompressedHaplotypes` stores every individual as a sequence of
//! `(value, length)` runs, with the runs of all individuals concatenated into two
//! flat arrays. `splits` holds the cumulative run count after each individual,
//! without the leading zero and the trailing total, so that splitting the flat
//! arrays at `splits` yields one slice per individual.
//!

use ndarray::Array2;
use std::io::BufRead;

use crate::encoding::{Genotype, Symbol};
use crate::errors::{HybridscanError, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompressedHaplotypes {
    values: Vec<u8>,
    lengths: Vec<i64>,
    splits: Vec<i64>,
}

/// Run-length encode a single line of genotype characters.
fn encode_line(line: &str) -> Option<(Vec<u8>, Vec<i64>)> {
    let mut values = Vec::new();
    let mut lengths = Vec::new();

    let mut current: Option<u8> = None;
    let mut last_break = 0;
    for (position, byte) in line.bytes().enumerate() {
        if current != Some(byte) {
            if current.is_some() {
                lengths.push((position - last_break) as i64);
            }
            values.push(Genotype::try_decode(&byte)?.index() as u8);
            current = Some(byte);
            last_break = position;
        }
    }
    if current.is_some() {
        lengths.push((line.len() - last_break) as i64);
    }

    Some((values, lengths))
}

impl CompressedHaplotypes {
    pub fn new(values: Vec<u8>, lengths: Vec<i64>, splits: Vec<i64>) -> Self {
        Self {
            values,
            lengths,
            splits,
        }
    }

    /// Compress individual-level ancestry, one line per individual.
    ///
    /// Reading stops at the first empty line. `source` is only used to name the input in
    /// error messages.
    pub fn compress(reader: impl BufRead, source: &str) -> Result<Self> {
        let mut values = Vec::new();
        let mut lengths = Vec::new();
        let mut boundaries: Vec<i64> = vec![0];
        let mut n_loci: Option<usize> = None;

        for (index, line) in reader.lines().enumerate() {
            let row = index + 1;
            let line = line.map_err(|err| {
                HybridscanError::ReadError(format!("Failed to read from {source}: {err}"))
            })?;
            let line = line.trim();
            if line.is_empty() {
                break;
            }

            match n_loci {
                Some(expected) if expected != line.len() => {
                    return Err(HybridscanError::malformed(
                        source,
                        row,
                        format!("expected {expected} loci, found {}", line.len()),
                    ));
                }
                _ => n_loci = Some(line.len()),
            }

            let (line_values, line_lengths) = encode_line(line).ok_or_else(|| {
                HybridscanError::malformed(source, row, "genotype outside of {0, 1, 2}")
            })?;

            boundaries.push(boundaries[boundaries.len() - 1] + line_values.len() as i64);
            values.extend(line_values);
            lengths.extend(line_lengths);
        }

        if n_loci.is_none() {
            return Err(HybridscanError::malformed(
                source,
                1,
                "no individuals before end of stream",
            ));
        }

        // the first and the last boundary are implied by the array bounds
        let splits = boundaries[1..boundaries.len() - 1].to_vec();

        Ok(Self::new(values, lengths, splits))
    }

    pub fn get_values(&self) -> &[u8] {
        &self.values
    }

    pub fn get_lengths(&self) -> &[i64] {
        &self.lengths
    }

    pub fn get_splits(&self) -> &[i64] {
        &self.splits
    }

    pub fn n_individuals(&self) -> usize {
        if self.values.is_empty() {
            0
        } else {
            self.splits.len() + 1
        }
    }

    /// Run ranges of every individual within the flat arrays.
    fn ranges(&self) -> Result<Vec<std::ops::Range<usize>>> {
        let mut ranges = Vec::with_capacity(self.splits.len() + 1);
        let mut begin = 0;
        for &split in self.splits.iter() {
            if split < begin as i64 || split as usize > self.values.len() {
                return Err(HybridscanError::ReadError(format!(
                    "Invalid split {split} for {} runs",
                    self.values.len()
                )));
            }
            ranges.push(begin..split as usize);
            begin = split as usize;
        }
        ranges.push(begin..self.values.len());
        Ok(ranges)
    }

    /// Expand the runs into a matrix of genotype codes of shape (individuals, loci).
    pub fn decompress(&self) -> Result<Array2<u8>> {
        if self.values.len() != self.lengths.len() {
            return Err(HybridscanError::ReadError(format!(
                "{} run values but {} run lengths",
                self.values.len(),
                self.lengths.len()
            )));
        }

        let ranges = self.ranges()?;
        let mut n_loci: Option<usize> = None;
        let mut codes: Vec<u8> = Vec::new();

        for (individual, range) in ranges.iter().enumerate() {
            let begin = codes.len();
            for (&value, &length) in self.values[range.clone()]
                .iter()
                .zip(&self.lengths[range.clone()])
            {
                if length < 0 {
                    return Err(HybridscanError::ReadError(format!(
                        "Negative run length {length} for individual {individual}"
                    )));
                }
                codes.extend(std::iter::repeat_n(value, length as usize));
            }
            let length = codes.len() - begin;
            match n_loci {
                Some(expected) if expected != length => {
                    return Err(HybridscanError::ReadError(format!(
                        "Individual {individual} covers {length} loci instead of {expected}"
                    )));
                }
                _ => n_loci = Some(length),
            }
        }

        let shape = (ranges.len(), n_loci.unwrap_or(0));
        Array2::from_shape_vec(shape, codes)
            .map_err(|err| HybridscanError::ReadError(format!("{err}")))
    }

    /// Expand the runs and remap codes 0, 1, 2 to ancestry fractions 0.0, 0.5, 1.0.
    pub fn decompress_float(&self) -> Result<Array2<f64>> {
        let codes = self.decompress()?;
        let dosages = codes
            .iter()
            .map(|&code| {
                Genotype::from_code(code)
                    .map(|genotype| genotype.dosage())
                    .ok_or_else(|| {
                        HybridscanError::ReadError(format!("Invalid genotype code {code}"))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        Array2::from_shape_vec(codes.dim(), dosages)
            .map_err(|err| HybridscanError::ReadError(format!("{err}")))
    }

    /// Expand the runs and write one line of genotype characters per individual.
    pub fn write_lines(&self, writer: &mut impl std::io::Write) -> Result<()> {
        let codes = self.decompress()?;
        for row in codes.rows() {
            let line: Vec<u8> = row
                .iter()
                .map(|&code| match Genotype::from_code(code) {
                    Some(genotype) => Ok(genotype.encode()),
                    None => Err(HybridscanError::ReadError(format!(
                        "Invalid genotype code {code}"
                    ))),
                })
                .collect::<Result<_>>()?;
            writer
                .write_all(&line)
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(|err| HybridscanError::WriteError(format!("{err}")))?;
        }
        Ok(())
    }
}
