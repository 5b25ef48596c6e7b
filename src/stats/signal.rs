//! Smoothed label tracks.
//!
//! Incompatibility loci are marked in coarse bins along each chromosome. Every marked
//! bin then spreads into its neighbours with a geometric decay, so that a model is
//! trained against peaks rather than isolated points.

use crate::core::Incompatibility;
use crate::errors::{HybridscanError, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct SignalTrack {
    bins: Vec<f64>,
    bins_per_chromosome: usize,
}

impl SignalTrack {
    /// Place one peak per incompatibility locus and propagate it along its chromosome.
    ///
    /// A locus at global index `i` falls into bin `i / bin_width` of its chromosome. The
    /// peak height is one minus the lowest fitness of the incompatibility; later loci
    /// overwrite earlier loci in the same bin.
    pub fn build(
        incompatibilities: &[Incompatibility],
        chromosome_length: usize,
        n_chromosomes: usize,
        bin_width: usize,
        decay: f64,
    ) -> Result<Self> {
        if bin_width == 0 || decay.is_nan() || decay <= 0. {
            return Err(HybridscanError::InvalidSetting(format!(
                "Signal track needs a positive bin width and decay, got {bin_width} and {decay}"
            )));
        }
        let bins_per_chromosome = chromosome_length / bin_width;
        if bins_per_chromosome == 0 {
            return Err(HybridscanError::InvalidSetting(format!(
                "Chromosomes of {chromosome_length} loci are shorter than one bin of {bin_width}"
            )));
        }

        let mut bins = vec![0.; bins_per_chromosome * n_chromosomes];
        for incompatibility in incompatibilities {
            let height = incompatibility.peak_height();
            for locus in incompatibility.loci(chromosome_length) {
                if locus.chromosome >= n_chromosomes {
                    return Err(HybridscanError::ReadError(format!(
                        "Locus {locus} lies beyond {n_chromosomes} chromosomes"
                    )));
                }
                let bin = (locus.position / bin_width).min(bins_per_chromosome - 1);
                bins[locus.chromosome * bins_per_chromosome + bin] = height;
            }
        }

        for chromosome in bins.chunks_mut(bins_per_chromosome) {
            propagate(chromosome, decay);
        }

        Ok(Self {
            bins,
            bins_per_chromosome,
        })
    }

    pub fn get_bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = &[f64]> {
        self.bins.chunks(self.bins_per_chromosome)
    }
}

/// Spread peaks forward, then backward, never lowering a bin.
pub fn propagate(track: &mut [f64], decay: f64) {
    for j in 1..track.len() {
        track[j] = track[j].max(track[j - 1] / decay);
    }
    for j in (0..track.len().saturating_sub(1)).rev() {
        track[j] = track[j].max(track[j + 1] / decay);
    }
}
