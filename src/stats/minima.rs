//! Local minima search over a per-locus curve.

use std::cmp::Ordering;

/// Local minima of `values` that are at most `max_value` and at least `spacing` apart.
///
/// A flat run of equal values counts as one minimum at its midpoint; the first and the
/// last element are never minima. When two minima are closer than `spacing`, the deeper
/// one is kept. The result is ordered by index.
pub fn find_minima(values: &[f64], max_value: f64, spacing: usize) -> Vec<(usize, f64)> {
    let candidates: Vec<usize> = local_minima(values)
        .into_iter()
        .filter(|&index| values[index] <= max_value)
        .collect();

    if spacing <= 1 {
        return candidates.into_iter().map(|i| (i, values[i])).collect();
    }

    // deepest first, later index first among ties
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        values[candidates[a]]
            .partial_cmp(&values[candidates[b]])
            .unwrap_or(Ordering::Equal)
            .then(b.cmp(&a))
    });

    let mut keep = vec![true; candidates.len()];
    for &current in order.iter() {
        if !keep[current] {
            continue;
        }
        let position = candidates[current];
        for left in (0..current).rev() {
            if position - candidates[left] >= spacing {
                break;
            }
            keep[left] = false;
        }
        for right in current + 1..candidates.len() {
            if candidates[right] - position >= spacing {
                break;
            }
            keep[right] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter(|(_, keep)| *keep)
        .map(|(index, _)| (index, values[index]))
        .collect()
}

fn local_minima(values: &[f64]) -> Vec<usize> {
    let mut minima = Vec::new();
    if values.len() < 3 {
        return minima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] > values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] > values[i] {
                minima.push((i + ahead - 1) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    minima
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_minima() {
        let values = [0.9, 0.2, 0.8, 0.7, 0.1, 0.6];
        assert_eq!(local_minima(&values), vec![1, 4]);
    }

    #[test]
    fn edges_are_not_minima() {
        let values = [0.1, 0.5, 0.9, 0.5, 0.1];
        assert!(local_minima(&values).is_empty());
    }

    #[test]
    fn plateau_reports_midpoint() {
        let values = [0.9, 0.3, 0.3, 0.3, 0.8];
        assert_eq!(local_minima(&values), vec![2]);
        // a plateau that runs into the edge is not a minimum
        let values = [0.9, 0.3, 0.3, 0.3];
        assert!(local_minima(&values).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let values = [0.9, 0.5, 0.9, 0.6, 0.9];
        assert_eq!(find_minima(&values, 0.5, 1), vec![(1, 0.5)]);
    }

    #[test]
    fn spacing_keeps_deepest() {
        let values = [1.0, 0.3, 0.9, 0.1, 0.9, 0.2, 1.0, 1.0, 1.0, 0.4, 1.0];
        let minima = find_minima(&values, 0.5, 3);
        assert_eq!(minima, vec![(3, 0.1), (9, 0.4)]);
    }

    #[test]
    fn removed_minima_do_not_suppress_others() {
        // 4 is removed by 2; 6 is kept although it is close to 4
        let values = [1.0, 0.5, 0.0, 0.5, 0.2, 0.5, 0.3, 1.0];
        let minima = find_minima(&values, 0.5, 3);
        assert_eq!(minima, vec![(2, 0.0), (6, 0.3)]);
    }
}
