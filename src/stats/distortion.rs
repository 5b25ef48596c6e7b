//! Segregation distortion statistics.
//!
//! Observed genotype counts are compared against an expectation with a chi-squared
//! goodness-of-fit test over the three genotype classes.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::sync::OnceLock;

use crate::core::{AncestryMatrix, Locus, LocusSummary};

/// Two free parameters for three genotype classes.
const DEGREES_OF_FREEDOM: f64 = 2.;

/// Expected counts below this threshold do not contribute to the statistic.
const MIN_EXPECTED: f64 = 1e-9;

static DISTRIBUTION: OnceLock<ChiSquared> = OnceLock::new();

fn distribution() -> &'static ChiSquared {
    DISTRIBUTION.get_or_init(|| {
        ChiSquared::new(DEGREES_OF_FREEDOM).expect("Degrees of freedom must be positive.")
    })
}

/// Genotype frequencies that a locus without distortion is expected to show.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Hardy-Weinberg proportions at the observed parent-2 ancestry.
    #[default]
    HardyWeinberg,
    /// Fixed 1:2:1 proportions of an F2 cross.
    Mendelian,
}

impl Expectation {
    /// Expected counts (homozygous p1, heterozygous, homozygous p2).
    pub fn expected(&self, observed: &[f64; 3]) -> [f64; 3] {
        let n: f64 = observed.iter().sum();
        match self {
            Expectation::HardyWeinberg => {
                if n == 0. {
                    return [0.; 3];
                }
                // p is parent-2 ancestry
                let p = (observed[2] + 0.5 * observed[1]) / n;
                hardy_weinberg(p, n)
            }
            Expectation::Mendelian => [0.25 * n, 0.5 * n, 0.25 * n],
        }
    }
}

/// Hardy-Weinberg genotype counts for parent-2 ancestry `p` in a sample of size `n`.
pub fn hardy_weinberg(p: f64, n: f64) -> [f64; 3] {
    let q = 1. - p;
    [q * q * n, 2. * p * q * n, p * p * n]
}

/// Pearson's chi-squared statistic, sum of (observed - expected)^2 / expected.
pub fn chi_squared(observed: &[f64; 3], expected: &[f64; 3]) -> f64 {
    observed
        .iter()
        .zip(expected)
        .filter(|(_, e)| **e > MIN_EXPECTED)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum()
}

/// Probability of a statistic at least as large under the expectation.
pub fn p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return 1.;
    }
    distribution().sf(statistic)
}

/// Trait extension to compute per-locus distortion of an ancestry matrix
pub trait LocusDistortion {
    fn chi_squared(&self, expectation: Expectation) -> Vec<f64>;

    fn p_values(&self, expectation: Expectation) -> Vec<f64> {
        self.chi_squared(expectation)
            .into_iter()
            .map(p_value)
            .collect()
    }

    fn summaries(&self, expectation: Expectation, incompatible: &[usize]) -> Vec<LocusSummary>;
}

impl LocusDistortion for AncestryMatrix {
    fn chi_squared(&self, expectation: Expectation) -> Vec<f64> {
        (0..self.n_loci())
            .map(|locus| {
                let observed = self.observed(locus);
                chi_squared(&observed, &expectation.expected(&observed))
            })
            .collect()
    }

    fn summaries(&self, expectation: Expectation, incompatible: &[usize]) -> Vec<LocusSummary> {
        let chromosome_length = self.chromosome_length();
        (0..self.n_loci())
            .map(|locus| {
                let observed = self.observed(locus);
                let expected = expectation.expected(&observed);
                let statistic = chi_squared(&observed, &expected);
                LocusSummary {
                    locus: Locus::from_global(locus, chromosome_length),
                    chi_squared: statistic,
                    p_value: p_value(statistic),
                    expected,
                    incompatible: incompatible.contains(&locus),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    fn matching_counts_have_no_distortion() {
        let observed = [25., 50., 25.];
        let expected = Expectation::HardyWeinberg.expected(&observed);
        assert_eq!(expected, [25., 50., 25.]);
        assert!(chi_squared(&observed, &expected).abs() < 1e-12);
        assert!((p_value(0.) - 1.).abs() < 1e-12);
    }

    #[test]
    fn heterozygote_excess_is_distorted() {
        let observed = [0., 4., 0.];
        let statistic = chi_squared(&observed, &Expectation::HardyWeinberg.expected(&observed));
        assert!((statistic - 4.).abs() < 1e-12);
        // two degrees of freedom: survival is exp(-x / 2)
        assert!((p_value(statistic) - (-2f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn hardy_weinberg_orders_classes_by_parent() {
        let expected = hardy_weinberg(0.8, 100.);
        assert!((expected[0] - 4.).abs() < 1e-9);
        assert!((expected[1] - 32.).abs() < 1e-9);
        assert!((expected[2] - 64.).abs() < 1e-9);
    }

    #[test]
    fn mendelian_expectation_detects_frequency_shift() {
        let observed = [64., 32., 4.];
        let hw = chi_squared(&observed, &Expectation::HardyWeinberg.expected(&observed));
        let mendel = chi_squared(&observed, &Expectation::Mendelian.expected(&observed));
        assert!(hw < 1e-9);
        assert!(mendel > 50.);
    }

    #[test]
    fn monomorphic_locus_is_finite() {
        let observed = [10., 0., 0.];
        let statistic = chi_squared(&observed, &Expectation::HardyWeinberg.expected(&observed));
        assert_eq!(statistic, 0.);
    }

    #[test]
    fn statistics_are_non_negative() {
        let counts = array![[5i64, 0, 10, 3], [0, 10, 0, 4], [5, 0, 0, 3]];
        let matrix = AncestryMatrix::from_counts(counts.view(), 2).unwrap();
        for expectation in [Expectation::HardyWeinberg, Expectation::Mendelian] {
            assert!(matrix.chi_squared(expectation).iter().all(|&x| x >= 0.));
            assert!(
                matrix
                    .p_values(expectation)
                    .iter()
                    .all(|&p| (0. ..=1.).contains(&p))
            );
        }
    }

    #[test]
    fn mendelian_population_has_no_distorted_loci() {
        // four individuals at 1:2:1 over two chromosomes of 1000 loci
        let mut counts = Array2::<i64>::zeros((3, 2000));
        counts.row_mut(0).fill(1);
        counts.row_mut(1).fill(2);
        counts.row_mut(2).fill(1);
        let matrix = AncestryMatrix::from_counts(counts.view(), 2).unwrap();

        let chi = matrix.chi_squared(Expectation::HardyWeinberg);
        assert_eq!(chi.len(), 2000);
        assert!(chi.iter().all(|x| x.abs() < 1e-9));

        let summaries = matrix.summaries(Expectation::HardyWeinberg, &[500, 1500]);
        assert!(summaries.iter().all(|summary| !summary.is_distorted(0.05)));
        assert!(summaries[1500].incompatible);
        assert_eq!(summaries[1500].locus, Locus::new(1, 500));
        assert_eq!(summaries[3].expected, [1., 2., 1.]);
    }
}
