//! Statistics and metric trait implementations

mod distortion;
mod minima;
mod signal;

pub use distortion::{Expectation, LocusDistortion, chi_squared, hardy_weinberg, p_value};
pub use minima::find_minima;
pub use signal::{SignalTrack, propagate};
