//! Feature archives built from manifest rows.

mod flm;
mod pairs;

pub use flm::{FLM_FEATURES, FlmArchive, FlmReplicate};
pub use pairs::{PairArchive, load_replicate, replicate_examples};
