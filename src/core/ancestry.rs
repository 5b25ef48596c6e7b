//! This module contains the `AncestryMatrix` struct and its associated methods.
//!
//! The `AncestryMatrix` stores, for every locus of a replicate, how many individuals
//! carry each of the three genotypes. It is built once from the population counts
//! written by the simulator and never changes afterwards.

use ndarray::{Array2, ArrayView2, Axis};

use crate::encoding::{Genotype, Symbol};
use crate::errors::{HybridscanError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct AncestryMatrix {
    counts: Array2<u64>,
    n_individuals: u64,
    n_chromosomes: usize,
}

impl AncestryMatrix {
    /// Construct from a count matrix of shape (3, loci).
    ///
    /// Rows are homozygous parent 1, heterozygous and homozygous parent 2. Every column must
    /// sum to the same population size.
    pub fn from_counts(counts: ArrayView2<i64>, n_chromosomes: usize) -> Result<Self> {
        let (n_genotypes, n_loci) = counts.dim();
        if n_genotypes != 3 {
            return Err(HybridscanError::ReadError(format!(
                "Expected 3 genotype rows, found {n_genotypes}"
            )));
        }
        if n_chromosomes == 0 || n_loci % n_chromosomes != 0 || n_loci == 0 {
            return Err(HybridscanError::DivisibilityViolation {
                loci: n_loci,
                chromosomes: n_chromosomes,
            });
        }
        if counts.iter().any(|&count| count < 0) {
            return Err(HybridscanError::ReadError(
                "Negative genotype count".to_string(),
            ));
        }

        let counts = counts.mapv(|count| count as u64);
        let totals = counts.sum_axis(Axis(0));
        let n_individuals = totals[0];
        if let Some(locus) = totals.iter().position(|&total| total != n_individuals) {
            return Err(HybridscanError::ReadError(format!(
                "Genotype counts at locus {locus} sum to {} instead of {n_individuals}",
                totals[locus]
            )));
        }

        Ok(Self {
            counts,
            n_individuals,
            n_chromosomes,
        })
    }

    /// Count genotypes over a matrix of codes of shape (individuals, loci).
    pub fn from_genotypes(codes: ArrayView2<u8>, n_chromosomes: usize) -> Result<Self> {
        let mut counts = Array2::<i64>::zeros((3, codes.ncols()));
        for row in codes.rows() {
            for (locus, &code) in row.iter().enumerate() {
                let genotype = Genotype::from_code(code).ok_or_else(|| {
                    HybridscanError::ReadError(format!("Invalid genotype code {code}"))
                })?;
                counts[[genotype.index(), locus]] += 1;
            }
        }
        Self::from_counts(counts.view(), n_chromosomes)
    }

    pub fn get_counts(&self) -> ArrayView2<u64> {
        self.counts.view()
    }

    pub fn n_individuals(&self) -> u64 {
        self.n_individuals
    }

    pub fn n_loci(&self) -> usize {
        self.counts.ncols()
    }

    pub fn n_chromosomes(&self) -> usize {
        self.n_chromosomes
    }

    pub fn chromosome_length(&self) -> usize {
        self.n_loci() / self.n_chromosomes
    }

    /// Observed genotype counts at a locus.
    pub fn observed(&self, locus: usize) -> [f64; 3] {
        [
            self.counts[[0, locus]] as f64,
            self.counts[[1, locus]] as f64,
            self.counts[[2, locus]] as f64,
        ]
    }

    /// Per-locus genotype proportions of shape (3, loci).
    pub fn proportions(&self) -> Array2<f64> {
        let n = self.n_individuals.max(1) as f64;
        self.counts.mapv(|count| count as f64 / n)
    }

    /// Mean parent-2 ancestry at every locus.
    pub fn mean_ancestry(&self) -> Vec<f64> {
        let n = self.n_individuals.max(1) as f64;
        (0..self.n_loci())
            .map(|locus| {
                (self.counts[[2, locus]] as f64 + 0.5 * self.counts[[1, locus]] as f64) / n
            })
            .collect()
    }

    /// Per-chromosome feature blocks of shape (chromosome length, 4).
    ///
    /// Columns are mean parent-2 ancestry and the proportions of homozygous p1,
    /// heterozygous and homozygous p2 individuals.
    pub fn chromosome_features(&self) -> Vec<Array2<f64>> {
        let ancestry = self.mean_ancestry();
        let proportions = self.proportions();
        let length = self.chromosome_length();

        (0..self.n_chromosomes)
            .map(|chromosome| {
                Array2::from_shape_fn((length, 4), |(offset, column)| {
                    let locus = chromosome * length + offset;
                    match column {
                        0 => ancestry[locus],
                        _ => proportions[[column - 1, locus]],
                    }
                })
            })
            .collect()
    }
}
