//! This module contains the core datatypes of the library.

mod ancestry;
mod haplotype;
mod incompatibility;
mod locus;
mod pair;

pub use ancestry::AncestryMatrix;
pub use haplotype::CompressedHaplotypes;
pub use incompatibility::{Incompatibility, IncompatibilityRecord};
pub use locus::{Locus, LocusSummary, UNLINKED};
pub use pair::{LocusPair, PAIR_FEATURES, PairExample};
