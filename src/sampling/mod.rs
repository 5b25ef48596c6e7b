//! Sampling of false loci and balanced locus-pair examples.

mod pairs;
mod selector;

pub use pairs::{
    PairSampler, SampleMode, choose_individuals, encode_pair, false_pairs, true_pairs,
};
pub use selector::LocusSelector;
