//! Labelled locus pairs and the examples built from them.

use ndarray::Array2;

use super::locus::Locus;

/// Number of features per individual: three genotype classes at each of two loci.
pub const PAIR_FEATURES: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocusPair {
    pub a: usize,
    pub b: usize,
    /// Whether the two loci form a true incompatibility.
    pub label: bool,
}

impl LocusPair {
    pub fn new(a: usize, b: usize, label: bool) -> Self {
        Self { a, b, label }
    }

    pub fn flipped(&self) -> Self {
        Self::new(self.b, self.a, self.label)
    }

    pub fn distance(&self, chromosome_length: usize) -> i32 {
        Locus::from_global(self.a, chromosome_length)
            .distance(&Locus::from_global(self.b, chromosome_length))
    }
}

/// One training example: a locus pair with the one-hot genotypes of a set of
/// individuals, shape (individuals, 6).
#[derive(Clone, Debug, PartialEq)]
pub struct PairExample {
    pub seed: i64,
    pub pair: LocusPair,
    pub distance: i32,
    pub genotypes: Array2<bool>,
}

impl PairExample {
    pub fn n_individuals(&self) -> usize {
        self.genotypes.nrows()
    }

    /// Metadata row: seed, locus a, locus b.
    pub fn meta(&self) -> [i64; 3] {
        [self.seed, self.pair.a as i64, self.pair.b as i64]
    }
}
