//! Selection of false incompatibility loci.
//!
//! False loci are strongly distorted loci that are far away from every true
//! incompatibility. They are taken from the local minima of the per-locus p-value curve.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::Settings;
use crate::core::AncestryMatrix;
use crate::errors::{HybridscanError, Result};
use crate::stats::{Expectation, LocusDistortion, find_minima};

#[derive(Clone, Debug, PartialEq)]
pub struct LocusSelector {
    maximum_p_value: f64,
    minimum_spacing: usize,
    minimum_distance: usize,
    chromosome_offset: usize,
    expectation: Expectation,
}

impl LocusSelector {
    pub fn new(settings: &Settings) -> Self {
        Self {
            maximum_p_value: settings.maximum_p_value,
            minimum_spacing: settings.minimum_spacing,
            minimum_distance: settings.minimum_distance,
            chromosome_offset: settings.chromosome_offset,
            expectation: settings.selector_expectation,
        }
    }

    /// Position on a line where loci of different chromosomes are far apart.
    fn separated(&self, locus: usize, chromosome_length: usize) -> usize {
        (locus / chromosome_length) * self.chromosome_offset + locus
    }

    /// Candidate false loci with their p-values, weakest distortion first.
    ///
    /// Candidates are the per-chromosome minima of `p_values` that lie further than the
    /// minimum distance from every true locus.
    pub fn candidates(
        &self,
        p_values: &[f64],
        chromosome_length: usize,
        true_loci: &[usize],
    ) -> Vec<(usize, f64)> {
        let separated_true: Vec<usize> = true_loci
            .iter()
            .map(|&locus| self.separated(locus, chromosome_length))
            .collect();

        let mut candidates: Vec<(usize, f64)> = p_values
            .chunks(chromosome_length)
            .enumerate()
            .flat_map(|(chromosome, curve)| {
                find_minima(curve, self.maximum_p_value, self.minimum_spacing)
                    .into_iter()
                    .map(move |(offset, p)| (chromosome * chromosome_length + offset, p))
            })
            .filter(|(locus, _)| {
                let position = self.separated(*locus, chromosome_length);
                separated_true
                    .iter()
                    .all(|&other| position.abs_diff(other) > self.minimum_distance)
            })
            .collect();

        // stable, so equal p-values keep genome order
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        log::debug!(
            "{} candidate false loci from {} loci",
            candidates.len(),
            p_values.len()
        );
        candidates
    }

    /// Pick one false locus per true locus, in random order.
    ///
    /// The most distorted candidates are taken when there are enough of them; otherwise
    /// candidates are drawn with replacement.
    pub fn select<R: Rng + ?Sized>(
        &self,
        matrix: &AncestryMatrix,
        true_loci: &[usize],
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let p_values = matrix.p_values(self.expectation);
        let candidates = self.candidates(&p_values, matrix.chromosome_length(), true_loci);
        let required = true_loci.len();

        let mut chosen: Vec<usize> = if candidates.len() >= required {
            candidates[candidates.len() - required..]
                .iter()
                .map(|(locus, _)| *locus)
                .collect()
        } else if !candidates.is_empty() {
            log::warn!(
                "InsufficientCandidates: {} candidate false loci for {} true loci, sampling with replacement",
                candidates.len(),
                required
            );
            (0..required)
                .map(|_| candidates[rng.random_range(0..candidates.len())].0)
                .collect()
        } else if required == 0 {
            Vec::new()
        } else {
            return Err(HybridscanError::InsufficientCandidates {
                required,
                available: 0,
            });
        };

        chosen.shuffle(rng);
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn selector() -> LocusSelector {
        LocusSelector::new(&Settings {
            minimum_spacing: 10,
            minimum_distance: 25,
            ..Settings::default()
        })
    }

    /// Flat curve of ones with dips at the given loci.
    fn curve(length: usize, dips: &[(usize, f64)]) -> Vec<f64> {
        let mut values = vec![1.; length];
        for &(locus, p) in dips {
            values[locus] = p;
        }
        values
    }

    #[test]
    fn candidates_exclude_loci_near_true_loci() {
        let p_values = curve(200, &[(20, 0.01), (60, 0.1), (150, 0.2), (170, 0.001)]);
        let candidates = selector().candidates(&p_values, 100, &[55, 160]);
        // 60 is near 55, 150 and 170 are near 160
        assert_eq!(candidates, vec![(20, 0.01)]);
    }

    #[test]
    fn candidates_sorted_weakest_first() {
        let p_values = curve(200, &[(20, 0.01), (60, 0.3), (120, 0.2), (180, 0.05)]);
        let candidates = selector().candidates(&p_values, 100, &[]);
        let loci: Vec<usize> = candidates.iter().map(|(locus, _)| *locus).collect();
        assert_eq!(loci, vec![60, 120, 180, 20]);
    }

    #[test]
    fn chromosome_offset_separates_neighbours_across_boundary() {
        // 101 is one locus away from 99 in the genome but on the next chromosome
        let p_values = curve(200, &[(101, 0.01)]);
        let candidates = selector().candidates(&p_values, 100, &[98]);
        assert_eq!(candidates, vec![(101, 0.01)]);
    }

    #[test]
    fn shallow_minima_are_ignored() {
        let p_values = curve(100, &[(40, 0.7)]);
        assert!(selector().candidates(&p_values, 100, &[]).is_empty());
    }

    /// Matrix with heterozygote excess at the given loci and 1:2:1 counts elsewhere.
    fn distorted_matrix(n_loci: usize, distorted: &[usize]) -> AncestryMatrix {
        let mut counts = Array2::<i64>::zeros((3, n_loci));
        for locus in 0..n_loci {
            let column = if distorted.contains(&locus) {
                [0, 40, 0]
            } else {
                [10, 20, 10]
            };
            for (genotype, count) in column.iter().enumerate() {
                counts[[genotype, locus]] = *count;
            }
        }
        AncestryMatrix::from_counts(counts.view(), 2).unwrap()
    }

    #[test]
    fn select_takes_most_distorted_candidates() {
        let matrix = distorted_matrix(200, &[20, 70, 130]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut chosen = selector().select(&matrix, &[180, 195], &mut rng).unwrap();
        assert_eq!(chosen.len(), 2);
        chosen.sort();
        // all three candidates are equally distorted; the last two in genome order win
        assert_eq!(chosen, vec![70, 130]);
    }

    #[test]
    fn select_samples_with_replacement_when_short() {
        let matrix = distorted_matrix(200, &[20]);
        let mut rng = StdRng::seed_from_u64(42);
        let chosen = selector()
            .select(&matrix, &[150, 160, 170, 180], &mut rng)
            .unwrap();
        assert_eq!(chosen, vec![20; 4]);
    }

    #[test]
    fn select_without_candidates_fails() {
        let matrix = distorted_matrix(200, &[]);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            selector().select(&matrix, &[150, 160], &mut rng),
            Err(HybridscanError::InsufficientCandidates {
                required: 2,
                available: 0
            })
        );
    }

    #[test]
    fn selection_is_reproducible() {
        let matrix = distorted_matrix(200, &[20, 50, 70, 120, 140]);
        let first = selector()
            .select(&matrix, &[180, 190], &mut StdRng::seed_from_u64(7))
            .unwrap();
        let second = selector()
            .select(&matrix, &[180, 190], &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(first, second);
    }
}
