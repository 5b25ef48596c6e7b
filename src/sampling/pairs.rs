//! Balanced locus-pair datasets.
//!
//! Every true incompatibility pair is matched by one false pair, and both are emitted in
//! both orders. False pairs never join two partners of the same incompatibility.

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::{LocusPair, PAIR_FEATURES, PairExample};
use crate::encoding::{Genotype, Symbol};
use crate::errors::{HybridscanError, Result};

/// How many individuals enter a pair example.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleMode {
    /// Exactly this many individuals, padded with repeats in small populations.
    Fixed(usize),
    /// Every individual of the replicate once.
    Ragged,
}

/// Indices of the individuals that enter one example.
pub fn choose_individuals<R: Rng + ?Sized>(
    n_individuals: usize,
    mode: SampleMode,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if n_individuals == 0 {
        return Err(HybridscanError::ReadError(
            "Cannot sample from an empty population".to_string(),
        ));
    }
    let chosen = match mode {
        SampleMode::Ragged => (0..n_individuals).collect(),
        SampleMode::Fixed(target) if n_individuals >= target => {
            rand::seq::index::sample(rng, n_individuals, target).into_vec()
        }
        SampleMode::Fixed(target) => {
            let mut chosen: Vec<usize> = (0..n_individuals).collect();
            for _ in n_individuals..target {
                chosen.push(rng.random_range(0..n_individuals));
            }
            chosen
        }
    };
    Ok(chosen)
}

/// True pairs in both orders.
pub fn true_pairs(incompatibilities: &[[usize; 2]]) -> Vec<LocusPair> {
    let forward: Vec<LocusPair> = incompatibilities
        .iter()
        .map(|&[a, b]| LocusPair::new(a, b, true))
        .collect();
    let flipped = forward.iter().map(LocusPair::flipped).collect::<Vec<_>>();
    [forward, flipped].concat()
}

/// As many false pairs as there are true pairs, in both orders.
///
/// The true pairs are split into two halves that keep partners together. Each half is
/// filled up with false loci to twice the number of incompatibilities, shuffled, and
/// the halves are zipped. Half of the zipped pairs are kept.
pub fn false_pairs<R: Rng + ?Sized>(
    incompatibilities: &[[usize; 2]],
    false_loci: &[usize],
    rng: &mut R,
) -> Result<Vec<LocusPair>> {
    let n_loci = 2 * incompatibilities.len();
    if false_loci.len() != n_loci {
        return Err(HybridscanError::InsufficientCandidates {
            required: n_loci,
            available: false_loci.len(),
        });
    }

    let half = incompatibilities.len() / 2;
    let mut first: Vec<usize> = incompatibilities[..half]
        .iter()
        .flatten()
        .copied()
        .collect();
    let mut second: Vec<usize> = incompatibilities[half..]
        .iter()
        .flatten()
        .copied()
        .collect();

    let n_false_first = n_loci - first.len();
    first.extend_from_slice(&false_loci[..n_false_first]);
    second.extend_from_slice(&false_loci[n_false_first..]);

    first.shuffle(rng);
    second.shuffle(rng);

    let forward: Vec<LocusPair> = first
        .into_iter()
        .zip(second)
        .take(incompatibilities.len())
        .map(|(a, b)| LocusPair::new(a, b, false))
        .collect();
    let flipped = forward.iter().map(LocusPair::flipped).collect::<Vec<_>>();
    Ok([forward, flipped].concat())
}

/// One-hot genotypes of both loci for the chosen individuals, shape (individuals, 6).
pub fn encode_pair(
    codes: ArrayView2<u8>,
    individuals: &[usize],
    pair: &LocusPair,
) -> Result<Array2<bool>> {
    let mut encoded = Array2::from_elem((individuals.len(), PAIR_FEATURES), false);
    for (row, &individual) in individuals.iter().enumerate() {
        for (offset, locus) in [(0, pair.a), (3, pair.b)] {
            let code = codes[[individual, locus]];
            let genotype = Genotype::from_code(code).ok_or_else(|| {
                HybridscanError::ReadError(format!(
                    "Invalid genotype code {code} for individual {individual} at locus {locus}"
                ))
            })?;
            encoded[[row, offset + genotype.index()]] = true;
        }
    }
    Ok(encoded)
}

#[derive(Clone, Debug, PartialEq)]
pub struct PairSampler {
    mode: SampleMode,
}

impl PairSampler {
    pub fn new(mode: SampleMode) -> Self {
        Self { mode }
    }

    /// Build all examples of one replicate, true pairs first.
    ///
    /// `codes` has shape (individuals, loci). Every example draws its own set of
    /// individuals.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        seed: i64,
        codes: ArrayView2<u8>,
        chromosome_length: usize,
        incompatibilities: &[[usize; 2]],
        false_loci: &[usize],
        rng: &mut R,
    ) -> Result<Vec<PairExample>> {
        let (n_individuals, n_loci) = codes.dim();
        if let Some(locus) = incompatibilities
            .iter()
            .flatten()
            .chain(false_loci)
            .find(|&&locus| locus >= n_loci)
        {
            return Err(HybridscanError::ReadError(format!(
                "Locus {locus} lies beyond {n_loci} loci"
            )));
        }

        let mut shuffled = incompatibilities.to_vec();
        shuffled.shuffle(rng);

        let mut pairs = true_pairs(&shuffled);
        pairs.extend(false_pairs(&shuffled, false_loci, rng)?);

        pairs
            .into_iter()
            .map(|pair| {
                let individuals = choose_individuals(n_individuals, self.mode, rng)?;
                Ok(PairExample {
                    seed,
                    pair,
                    distance: pair.distance(chromosome_length),
                    genotypes: encode_pair(codes, &individuals, &pair)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UNLINKED;
    use itertools::Itertools;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    #[test]
    fn fixed_mode_without_replacement() {
        let chosen = choose_individuals(1000, SampleMode::Fixed(500), &mut rng()).unwrap();
        assert_eq!(chosen.len(), 500);
        assert_eq!(chosen.iter().unique().count(), 500);
        assert!(chosen.iter().all(|&i| i < 1000));
    }

    #[test]
    fn fixed_mode_pads_small_population() {
        let chosen = choose_individuals(300, SampleMode::Fixed(500), &mut rng()).unwrap();
        assert_eq!(chosen.len(), 500);
        // every individual appears at least once
        assert_eq!(chosen.iter().unique().count(), 300);
        assert_eq!(&chosen[..300], (0..300).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn fixed_mode_pads_tiny_population() {
        let chosen = choose_individuals(3, SampleMode::Fixed(10), &mut rng()).unwrap();
        assert_eq!(chosen.len(), 10);
        assert!(chosen.iter().all(|&i| i < 3));
    }

    #[test]
    fn ragged_mode_keeps_everyone() {
        let chosen = choose_individuals(7, SampleMode::Ragged, &mut rng()).unwrap();
        assert_eq!(chosen, (0..7).collect::<Vec<_>>());
        assert!(choose_individuals(0, SampleMode::Ragged, &mut rng()).is_err());
    }

    #[test]
    fn true_pairs_in_both_orders() {
        let pairs = true_pairs(&[[1, 2], [3, 4]]);
        assert_eq!(
            pairs,
            vec![
                LocusPair::new(1, 2, true),
                LocusPair::new(3, 4, true),
                LocusPair::new(2, 1, true),
                LocusPair::new(4, 3, true),
            ]
        );
    }

    #[test]
    fn false_pairs_are_balanced_and_never_join_partners() {
        let incompatibilities = [[10, 20], [30, 40], [50, 60], [70, 80], [90, 95]];
        let partners: HashSet<(usize, usize)> = incompatibilities
            .iter()
            .flat_map(|&[a, b]| [(a, b), (b, a)])
            .collect();
        let false_loci: Vec<usize> = (200..210).collect();

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairs = false_pairs(&incompatibilities, &false_loci, &mut rng).unwrap();
            assert_eq!(pairs.len(), 2 * incompatibilities.len());
            assert!(pairs.iter().all(|pair| !pair.label));
            assert!(pairs.iter().all(|pair| !partners.contains(&(pair.a, pair.b))));
            let (forward, flipped) = pairs.split_at(incompatibilities.len());
            for (pair, flip) in forward.iter().zip(flipped) {
                assert_eq!(pair.flipped(), *flip);
            }
        }
    }

    #[test]
    fn false_pairs_require_one_false_locus_per_true_locus() {
        assert!(false_pairs(&[[1, 2]], &[5], &mut rng()).is_err());
    }

    #[test]
    fn encode_pair_concatenates_both_loci() {
        let codes = array![[0u8, 1, 2], [2, 2, 0]];
        let encoded = encode_pair(codes.view(), &[1, 0, 1], &LocusPair::new(0, 2, true)).unwrap();
        assert_eq!(
            encoded,
            array![
                [false, false, true, true, false, false],
                [true, false, false, false, false, true],
                [false, false, true, true, false, false],
            ]
        );
    }

    #[test]
    fn sample_builds_balanced_examples() {
        // 6 individuals, 2 chromosomes of 100 loci
        let codes = Array2::from_shape_fn((6, 200), |(i, j)| ((i + j) % 3) as u8);
        let incompatibilities = [[10, 150], [20, 60], [120, 180]];
        let false_loci = [30, 40, 80, 100, 130, 170];
        let sampler = PairSampler::new(SampleMode::Fixed(4));

        let examples = sampler
            .sample(
                9,
                codes.view(),
                100,
                &incompatibilities,
                &false_loci,
                &mut rng(),
            )
            .unwrap();

        assert_eq!(examples.len(), 12);
        assert_eq!(examples.iter().filter(|e| e.pair.label).count(), 6);
        assert_eq!(examples.iter().filter(|e| !e.pair.label).count(), 6);
        for example in examples.iter() {
            assert_eq!(example.genotypes.dim(), (4, 6));
            assert_eq!(example.seed, 9);
            // exactly one genotype per locus
            for row in example.genotypes.rows() {
                assert_eq!(row.iter().filter(|&&x| x).count(), 2);
            }
        }

        let unlinked = examples
            .iter()
            .find(|e| e.pair == LocusPair::new(10, 150, true))
            .unwrap();
        assert_eq!(unlinked.distance, UNLINKED);
        let linked = examples
            .iter()
            .find(|e| e.pair == LocusPair::new(60, 20, true))
            .unwrap();
        assert_eq!(linked.distance, 40);
    }

    #[test]
    fn ragged_examples_hold_every_individual() {
        let codes = Array2::from_shape_fn((7, 100), |(i, j)| ((i * j) % 3) as u8);
        let sampler = PairSampler::new(SampleMode::Ragged);
        let examples = sampler
            .sample(1, codes.view(), 50, &[[5, 70]], &[20, 90], &mut rng())
            .unwrap();
        assert_eq!(examples.len(), 4);
        assert!(examples.iter().all(|e| e.n_individuals() == 7));
    }

    #[test]
    fn loci_beyond_genome_fail() {
        let codes = Array2::<u8>::zeros((2, 10));
        let sampler = PairSampler::new(SampleMode::Ragged);
        assert!(
            sampler
                .sample(1, codes.view(), 5, &[[1, 12]], &[2, 3], &mut rng())
                .is_err()
        );
    }

    #[test]
    fn sampling_is_reproducible() {
        let codes = Array2::from_shape_fn((20, 200), |(i, j)| ((i + 2 * j) % 3) as u8);
        let sampler = PairSampler::new(SampleMode::Fixed(8));
        let run = |seed| {
            sampler
                .sample(
                    3,
                    codes.view(),
                    100,
                    &[[10, 150], [20, 60]],
                    &[30, 90, 120, 170],
                    &mut StdRng::seed_from_u64(seed),
                )
                .unwrap()
        };
        assert_eq!(run(5), run(5));
    }
}
