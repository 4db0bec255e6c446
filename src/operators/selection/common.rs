//! Shared machinery of the selection operators: non-dominated sorting,
//! crowding distances, and the selection-weight / cdf helpers of the
//! single-objective schemes.

use crate::genetic::FitnessMatrix;
use crate::math;

/// The result of a non-dominated sort: candidate indices grouped into
/// Pareto fronts (front 0 first) and the front index of every candidate.
#[derive(Debug, Clone)]
pub struct ParetoFronts {
    pub fronts: Vec<Vec<usize>>,
    pub ranks: Vec<usize>,
}

/// Sort a fitness matrix into Pareto fronts.
///
/// The naive O(M * N^2) algorithm: count the dominators of each candidate
/// and record the candidates it dominates, then peel the fronts off by
/// decrementing the domination counts.
pub fn non_dominated_sort(fitness_matrix: &FitnessMatrix) -> ParetoFronts {
    let n = fitness_matrix.nrows();

    let mut dom_count = vec![0_usize; n];
    let mut dom_list: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in 0..n {
        for j in 0..i {
            match math::pareto_compare(fitness_matrix.row(i), fitness_matrix.row(j)) {
                1 => {
                    dom_count[j] += 1;
                    dom_list[i].push(j);
                }
                -1 => {
                    dom_count[i] += 1;
                    dom_list[j].push(i);
                }
                _ => {}
            }
        }
    }

    let mut ranks = vec![0_usize; n];
    let mut current_front: Vec<usize> = (0..n).filter(|&i| dom_count[i] == 0).collect();

    let mut fronts = Vec::new();
    let mut front_idx = 1;
    while !current_front.is_empty() {
        let mut next_front = Vec::new();
        for &idx in &current_front {
            for &dominated in &dom_list[idx] {
                dom_count[dominated] -= 1;
                if dom_count[dominated] == 0 {
                    next_front.push(dominated);
                    ranks[dominated] = front_idx;
                }
            }
        }
        fronts.push(std::mem::take(&mut current_front));
        current_front = next_front;
        front_idx += 1;
    }

    ParetoFronts { fronts, ranks }
}

/// Crowding distances of the candidates, computed per front.
///
/// For each objective the front is sorted by that coordinate; the extremes
/// get an infinite distance and the interior candidates accumulate the
/// normalized gap between their neighbours. The fronts are re-sorted in
/// place as a side effect.
pub fn crowding_distances(fitness_matrix: &FitnessMatrix, fronts: &mut [Vec<usize>]) -> Vec<f64> {
    let mut distances = vec![0.0; fitness_matrix.nrows()];

    for front in fronts.iter_mut() {
        if front.is_empty() {
            continue;
        }
        for d in 0..fitness_matrix.ncols() {
            front.sort_by(|&a, &b| {
                fitness_matrix[[a, d]]
                    .partial_cmp(&fitness_matrix[[b, d]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let first = front[0];
            let last = front[front.len() - 1];
            let interval = (fitness_matrix[[last, d]] - fitness_matrix[[first, d]]).max(1e-6);

            distances[first] = f64::INFINITY;
            distances[last] = f64::INFINITY;
            for i in 1..front.len().saturating_sub(1) {
                let prev = front[i - 1];
                let next = front[i + 1];
                distances[front[i]] +=
                    (fitness_matrix[[next, d]] - fitness_matrix[[prev, d]]) / interval;
            }
        }
    }

    distances
}

/// The scalar fitness values of a single-objective fitness matrix.
pub fn scalar_fitness(fitness_matrix: &FitnessMatrix) -> Vec<f64> {
    fitness_matrix.column(0).to_vec()
}

/// Fitness-proportional selection weights, shifted so negative fitness
/// values still get positive weights.
pub fn roulette_weights(fitness: &[f64]) -> Vec<f64> {
    let fmin = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    // Double the shift so the worst candidate keeps a nonzero weight.
    let offset = (2.0 * fmin).min(0.0);

    fitness.iter().map(|f| f - offset).collect()
}

/// Rank-based selection weights interpolated between `min_weight` and
/// `max_weight` over the fitness-sorted population.
pub fn rank_weights(fitness: &[f64], min_weight: f64, max_weight: f64) -> Vec<f64> {
    let n = fitness.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| fitness[a].partial_cmp(&fitness[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut weights = vec![0.0; n];
    for (pos, &idx) in indices.iter().enumerate() {
        let t = if n > 1 { pos as f64 / (n - 1) as f64 } else { 1.0 };
        weights[idx] = min_weight + t * (max_weight - min_weight);
    }
    weights
}

/// Sigma-scaled selection weights: `max(0, 1 + (f - mean) / (scale * sd))`
/// with the deviation floored at 1e-6.
pub fn sigma_weights(fitness: &[f64], scale: f64) -> Vec<f64> {
    let n = fitness.len() as f64;
    let mean = fitness.iter().sum::<f64>() / n;
    let variance = fitness.iter().map(|f| (f - mean) * (f - mean)).sum::<f64>() / n;
    let sd = variance.sqrt().max(1e-6);

    fitness
        .iter()
        .map(|f| (1.0 + (f - mean) / (scale * sd)).max(0.0))
        .collect()
}

/// Boltzmann selection weights at the given temperature.
pub fn boltzmann_weights(fitness: &[f64], temperature: f64) -> Vec<f64> {
    let fmin = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let fmax = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let df = (fmax - fmin).max(1e-6);

    fitness
        .iter()
        .map(|f| {
            let fnorm = (f - fmin) / df;
            f64::exp(fnorm / temperature)
        })
        .collect()
}

/// Turn selection weights into a non-decreasing cdf whose last entry is
/// approximately 1. Degenerate all-zero weights fall back to a uniform
/// distribution.
pub fn weights_to_cdf(weights: &[f64]) -> Vec<f64> {
    let n = weights.len() as f64;
    let mean = weights.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return (1..=weights.len()).map(|i| i as f64 / n).collect();
    }

    let mut cdf = 0.0;
    weights
        .iter()
        .map(|w| {
            cdf += w / mean / n;
            cdf
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_non_dominated_sort_front_structure() {
        // Front 0: (4, 4). Front 1: (3, 1), (1, 3). Front 2: (0, 0).
        let fmat = array![[3.0, 1.0], [4.0, 4.0], [0.0, 0.0], [1.0, 3.0]];
        let sorted = non_dominated_sort(&fmat);

        assert_eq!(sorted.fronts.len(), 3);
        assert_eq!(sorted.fronts[0], vec![1]);
        assert_eq!(sorted.ranks, vec![1, 0, 2, 1]);

        // No candidate is dominated by anything in a later front, and every
        // candidate past front 0 is dominated by someone in the previous one.
        for (front_idx, front) in sorted.fronts.iter().enumerate() {
            for &idx in front {
                for later in sorted.fronts.iter().skip(front_idx + 1) {
                    for &other in later {
                        assert!(!math::pareto_dominates(fmat.row(other), fmat.row(idx)));
                    }
                }
                if front_idx > 0 {
                    let dominated_by_prev = sorted.fronts[front_idx - 1]
                        .iter()
                        .any(|&other| math::pareto_dominates(fmat.row(other), fmat.row(idx)));
                    assert!(dominated_by_prev);
                }
            }
        }
    }

    #[test]
    fn test_non_dominated_sort_single_front() {
        let fmat = array![[1.0, 0.0], [0.5, 0.5], [0.0, 1.0]];
        let sorted = non_dominated_sort(&fmat);
        assert_eq!(sorted.fronts.len(), 1);
        assert_eq!(sorted.ranks, vec![0, 0, 0]);
    }

    #[test]
    fn test_crowding_extremes_are_infinite() {
        let fmat = array![[0.0, 3.0], [1.0, 2.0], [2.0, 1.0], [3.0, 0.0]];
        let mut fronts = vec![vec![0, 1, 2, 3]];
        let dists = crowding_distances(&fmat, &mut fronts);

        assert!(dists[0].is_infinite());
        assert!(dists[3].is_infinite());
        assert!(dists[1].is_finite() && dists[1] > 0.0);
        assert_abs_diff_eq!(dists[1], dists[2], epsilon = 1e-12);
    }

    #[test]
    fn test_crowding_duplicate_extremes_stay_infinite() {
        // Duplicates of the extreme points must not steal the infinite
        // distance from them.
        let fmat = array![[0.0, 3.0], [0.0, 3.0], [1.0, 2.0], [3.0, 0.0], [3.0, 0.0]];
        let mut fronts = vec![vec![0, 1, 2, 3, 4]];
        let dists = crowding_distances(&fmat, &mut fronts);

        let extreme_count = dists.iter().filter(|d| d.is_infinite()).count();
        assert!(extreme_count >= 2);
        assert!(dists[2].is_finite());
    }

    #[test]
    fn test_roulette_weights_shift_negative_fitness() {
        let weights = roulette_weights(&[-2.0, 0.0, 2.0]);
        assert_eq!(weights, vec![2.0, 4.0, 6.0]);
        assert!(weights.iter().all(|&w| w > 0.0));

        // All-positive fitness is left untouched.
        let weights = roulette_weights(&[1.0, 2.0]);
        assert_eq!(weights, vec![1.0, 2.0]);
    }

    #[test]
    fn test_rank_weights_follow_the_fitness_order() {
        let weights = rank_weights(&[5.0, 1.0, 3.0], 0.1, 1.1);
        assert_abs_diff_eq!(weights[1], 0.1);
        assert_abs_diff_eq!(weights[2], 0.6);
        assert_abs_diff_eq!(weights[0], 1.1);
    }

    #[test]
    fn test_sigma_weights_are_clamped_at_zero() {
        let weights = sigma_weights(&[0.0, 0.0, 0.0, 100.0], 1.0);
        assert!(weights.iter().all(|&w| w >= 0.0));
        assert!(weights[3] > weights[0]);
    }

    #[test]
    fn test_boltzmann_weights_prefer_better_fitness() {
        let low_temp = boltzmann_weights(&[0.0, 1.0], 0.25);
        let high_temp = boltzmann_weights(&[0.0, 1.0], 4.0);
        // Selection pressure decreases with the temperature.
        assert!(low_temp[1] / low_temp[0] > high_temp[1] / high_temp[0]);
    }

    #[test]
    fn test_weights_to_cdf_ends_at_one() {
        let cdf = weights_to_cdf(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cdf.len(), 4);
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
        assert_abs_diff_eq!(cdf[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_to_cdf_degenerate_weights() {
        let cdf = weights_to_cdf(&[0.0, 0.0]);
        assert_abs_diff_eq!(cdf[0], 0.5);
        assert_abs_diff_eq!(cdf[1], 1.0);
    }
}
