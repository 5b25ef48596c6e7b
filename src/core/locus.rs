//! Locus addressing.
//!
//! Loci are stored as global indices over the concatenated genome. A `Locus` splits the
//! global index into a chromosome and a position within that chromosome.

use std::fmt;

/// Distance reported for two loci on different chromosomes.
pub const UNLINKED: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locus {
    pub chromosome: usize,
    pub position: usize,
}

impl Locus {
    pub fn new(chromosome: usize, position: usize) -> Self {
        Self {
            chromosome,
            position,
        }
    }

    pub fn from_global(index: usize, chromosome_length: usize) -> Self {
        Self::new(index / chromosome_length, index % chromosome_length)
    }

    /// Number of loci between two loci on the same chromosome, `UNLINKED` otherwise.
    pub fn distance(&self, other: &Locus) -> i32 {
        if self.chromosome != other.chromosome {
            return UNLINKED;
        }
        self.position.abs_diff(other.position) as i32
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chromosome, self.position)
    }
}

/// Per-locus distortion summary.
#[derive(Clone, Debug, PartialEq)]
pub struct LocusSummary {
    pub locus: Locus,
    pub chi_squared: f64,
    pub p_value: f64,
    /// Expected genotype counts (homozygous p1, heterozygous, homozygous p2).
    pub expected: [f64; 3],
    pub incompatible: bool,
}

impl LocusSummary {
    pub fn is_distorted(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}
