//! NSGA-III: reference-point-based many-objective selection.
//!
//! Implementation of K. Deb & H. Jain, "An Evolutionary Many-Objective
//! Optimization Algorithm Using Reference-Point-Based Nondominated Sorting
//! Approach, Part I", IEEE Transactions on Evolutionary Computation
//! 18 (4): 577-601 (2014).
//!
//! The reference-point set is generated once at `init` by greedy
//! dispersion over a pool of random simplex points and stays fixed for the
//! run. Each generation the fitness vectors are normalized against the
//! tracked ideal and nadir points, every candidate is associated with its
//! nearest reference direction through the cone-tree index, and the
//! niching step of `next_population` balances the per-reference-point
//! candidate counts.

use ndarray::{Array1, Array2, ArrayView1};
use ndarray_stats::QuantileExt;
use rayon::prelude::*;

use crate::cone_tree::ConeTree;
use crate::context::RunInfo;
use crate::error::EvolveError;
use crate::genetic::FitnessMatrix;
use crate::math;
use crate::operators::GeneticOperator;
use crate::operators::selection::{Selection, common};
use crate::random;

/// The spread floor used whenever a normalization denominator could
/// collapse to zero.
const MIN_SPREAD: f64 = 1e-6;

/// Per-candidate bookkeeping: dominance rank, associated reference point
/// and the squared perpendicular distance to its reference ray.
#[derive(Debug, Clone, Copy, Default)]
struct CandidateInfo {
    rank: usize,
    ref_idx: usize,
    ref_dist: f64,
}

/// The NSGA-III selection strategy.
#[derive(Debug, Default)]
pub struct Nsga3 {
    ref_points: Vec<Array1<f64>>,
    niche_counts: Vec<usize>,
    assoc_tree: Option<ConeTree>,
    ideal: Array1<f64>,
    extremes: Vec<Array1<f64>>,
    nadir: Array1<f64>,
    sol_info: Vec<CandidateInfo>,
}

impl Nsga3 {
    pub fn new() -> Self {
        Self::default()
    }

    /// The niched-compare operator: lower rank wins, then the less crowded
    /// reference point, then the smaller distance to the reference ray.
    fn niched_compare(&self, lhs: usize, rhs: usize) -> bool {
        let (a, b) = (&self.sol_info[lhs], &self.sol_info[rhs]);
        if a.rank != b.rank {
            a.rank < b.rank
        } else if self.niche_counts[a.ref_idx] != self.niche_counts[b.ref_idx] {
            self.niche_counts[a.ref_idx] < self.niche_counts[b.ref_idx]
        } else {
            a.ref_dist < b.ref_dist
        }
    }

    /// Update the normalization state from the fitness matrix, then
    /// associate every candidate with its closest reference point.
    fn associate(&mut self, fitness_matrix: &FitnessMatrix) {
        update_ideal_point(&mut self.ideal, fitness_matrix);
        update_extreme_points(&mut self.extremes, fitness_matrix, &self.ideal);
        self.nadir = find_nadir_point(&self.extremes);

        let tree = self.assoc_tree.as_ref().expect("the operator is initialized");
        let ideal = &self.ideal;
        let nadir = &self.nadir;
        let ref_points = &self.ref_points;

        let associations: Vec<(usize, f64)> = (0..fitness_matrix.nrows())
            .into_par_iter()
            .map(|row| {
                let fnorm = normalize_fitness(fitness_matrix.row(row), ideal, nadir);
                let best = tree.find_best_match(fnorm.view());
                let dist =
                    math::perpendicular_distance_sq(ref_points[best.index].view(), fnorm.view());
                (best.index, dist)
            })
            .collect();

        for (info, (ref_idx, ref_dist)) in self.sol_info.iter_mut().zip(associations) {
            info.ref_idx = ref_idx;
            info.ref_dist = ref_dist;
        }
    }

    fn reset_niche_counts(&mut self) {
        for count in &mut self.niche_counts {
            *count = 0;
        }
    }
}

impl GeneticOperator for Nsga3 {
    fn name(&self) -> String {
        "NSGA-III".into()
    }
}

impl Selection for Nsga3 {
    fn init(&mut self, info: &RunInfo) -> Result<(), EvolveError> {
        if info.num_objectives < 2 {
            return Err(EvolveError::InvalidArgument(
                "NSGA-III requires at least 2 objectives".into(),
            ));
        }

        let fitness_matrix = info.fitness_matrix;

        self.ref_points =
            generate_reference_points(info.population_size, info.num_objectives);
        self.niche_counts = vec![0; self.ref_points.len()];

        // The association tree searches over the unit directions of the
        // reference points; a maximal inner product with a unit direction
        // is a minimal perpendicular distance to its ray.
        let mut directions = Array2::zeros((self.ref_points.len(), info.num_objectives));
        for (i, point) in self.ref_points.iter().enumerate() {
            directions
                .row_mut(i)
                .assign(&math::normalize_vector(point.view()));
        }
        self.assoc_tree = Some(ConeTree::new(directions));

        self.ideal = column_max(fitness_matrix);
        self.extremes = Vec::new();

        self.sol_info = vec![CandidateInfo::default(); fitness_matrix.nrows()];
        let sorted = common::non_dominated_sort(fitness_matrix);
        for (idx, &rank) in sorted.ranks.iter().enumerate() {
            self.sol_info[idx].rank = rank;
        }
        self.associate(fitness_matrix);

        self.reset_niche_counts();
        for info in &self.sol_info {
            self.niche_counts[info.ref_idx] += 1;
        }

        Ok(())
    }

    fn select(&self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) -> usize {
        debug_assert_eq!(fitness_matrix.nrows(), self.sol_info.len());

        let first = random::random_index(fitness_matrix.nrows());
        let second = random::random_index(fitness_matrix.nrows());

        if self.niched_compare(first, second) { first } else { second }
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        let n = info.population_size;
        debug_assert!(combined.nrows() >= n);

        let sorted = common::non_dominated_sort(combined);
        self.sol_info = vec![CandidateInfo::default(); combined.nrows()];
        for (idx, &rank) in sorted.ranks.iter().enumerate() {
            self.sol_info[idx].rank = rank;
        }
        self.associate(combined);

        let mut new_pop: Vec<usize> = Vec::with_capacity(n);
        let mut new_info: Vec<CandidateInfo> = Vec::with_capacity(n);
        let mut partial: Vec<usize> = Vec::new();

        for front in &sorted.fronts {
            if new_pop.len() + front.len() <= n {
                for &idx in front {
                    new_pop.push(idx);
                    new_info.push(self.sol_info[idx]);
                }
            } else {
                partial = front.clone();
                break;
            }
        }

        // Niche counts reflect only what has been selected so far.
        self.reset_niche_counts();
        for info in &new_info {
            self.niche_counts[info.ref_idx] += 1;
        }

        while new_pop.len() < n {
            // The least crowded reference points among those that still
            // have an unchosen associate in the splitting front.
            let min_count = partial
                .iter()
                .map(|&idx| self.niche_counts[self.sol_info[idx].ref_idx])
                .min()
                .expect("the splitting front is not empty");

            let mut min_refs: Vec<usize> = Vec::new();
            for &idx in &partial {
                let ref_idx = self.sol_info[idx].ref_idx;
                if self.niche_counts[ref_idx] == min_count && !min_refs.contains(&ref_idx) {
                    min_refs.push(ref_idx);
                }
            }
            let chosen_ref = *random::random_element(&min_refs);

            // The closest associate of the chosen reference point wins.
            let mut selected = partial[0];
            let mut min_dist = f64::INFINITY;
            for &idx in &partial {
                if self.sol_info[idx].ref_idx == chosen_ref
                    && self.sol_info[idx].ref_dist < min_dist
                {
                    min_dist = self.sol_info[idx].ref_dist;
                    selected = idx;
                }
            }

            new_pop.push(selected);
            new_info.push(self.sol_info[selected]);
            partial.retain(|&idx| idx != selected);
            self.niche_counts[chosen_ref] += 1;
        }

        self.sol_info = new_info;
        new_pop
    }
}

/// Reference points on the unit simplex by greedy dispersion: sample a
/// large candidate pool, then repeatedly accept the candidate furthest
/// from the already accepted set.
pub fn generate_reference_points(count: usize, dim: usize) -> Vec<Array1<f64>> {
    assert!(count > 0);
    assert!(dim > 1);

    let pool_multiplier = 10.max(2 * dim);
    let mut candidates: Vec<Array1<f64>> = (0..pool_multiplier * count - 1)
        .map(|_| random::random_simplex_point(dim))
        .collect();

    let mut points = Vec::with_capacity(count);
    points.push(random::random_simplex_point(dim));

    // Running distance of every candidate to its nearest accepted point.
    let mut min_distances = vec![f64::INFINITY; candidates.len()];
    while points.len() < count {
        let newest = points.last().expect("at least one point is accepted");
        for (candidate, dmin) in candidates.iter().zip(min_distances.iter_mut()) {
            let dist = math::euclidean_distance_sq(candidate.view(), newest.view());
            *dmin = dmin.min(dist);
        }

        let argmax = min_distances
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| idx)
            .expect("the candidate pool is not empty");

        points.push(candidates.swap_remove(argmax));
        min_distances.swap_remove(argmax);
    }

    points
}

fn column_max(fitness_matrix: &FitnessMatrix) -> Array1<f64> {
    fitness_matrix.fold_axis(ndarray::Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x))
}

/// The ideal point is the running elementwise maximum of all fitness
/// vectors seen so far (maximization convention).
fn update_ideal_point(ideal: &mut Array1<f64>, fitness_matrix: &FitnessMatrix) {
    let current_max = column_max(fitness_matrix);
    for (i, m) in ideal.iter_mut().zip(current_max.iter()) {
        *i = i.max(*m);
    }
}

/// The achievement scalarizing function: a weighted Chebyshev distance
/// from the ideal point.
fn achievement_scalarizing(
    fitness: ArrayView1<f64>,
    ideal: &Array1<f64>,
    weights: &Array1<f64>,
) -> f64 {
    fitness
        .iter()
        .zip(ideal.iter())
        .zip(weights.iter())
        .map(|((&f, &z), &w)| (f - z).abs() / w)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn asf_weights(dim: usize, axis: usize) -> Array1<f64> {
    let mut weights = Array1::from_elem(dim, MIN_SPREAD);
    weights[axis] = 1.0;
    weights
}

/// For each objective axis, the new extreme point is the ASF-minimizing
/// vector over the current population and the previous extremes.
fn update_extreme_points(
    extremes: &mut Vec<Array1<f64>>,
    fitness_matrix: &FitnessMatrix,
    ideal: &Array1<f64>,
) {
    let dim = ideal.len();
    let mut new_extremes = Vec::with_capacity(dim);

    for axis in 0..dim {
        let weights = asf_weights(dim, axis);

        let population_asf: Array1<f64> = fitness_matrix
            .rows()
            .into_iter()
            .map(|row| achievement_scalarizing(row, ideal, &weights))
            .collect();
        let best_row = population_asf
            .argmin()
            .expect("the fitness matrix is not empty");

        let extreme_asf: Array1<f64> = extremes
            .iter()
            .map(|e| achievement_scalarizing(e.view(), ideal, &weights))
            .collect();

        match extreme_asf.argmin() {
            Ok(best_extreme) if extreme_asf[best_extreme] < population_asf[best_row] => {
                new_extremes.push(extremes[best_extreme].clone());
            }
            _ => new_extremes.push(fitness_matrix.row(best_row).to_owned()),
        }
    }

    *extremes = new_extremes;
}

/// The nadir estimate is the elementwise minimum of the extreme points
/// (the worst of the extremes along each axis, under maximization).
fn find_nadir_point(extremes: &[Array1<f64>]) -> Array1<f64> {
    let mut nadir = extremes[0].clone();
    for extreme in &extremes[1..] {
        for (n, &e) in nadir.iter_mut().zip(extreme.iter()) {
            *n = n.min(e);
        }
    }
    nadir
}

/// Map a fitness vector into the normalized objective space: the ideal
/// point goes to the origin and worse values move away from it, so the
/// reference rays through the simplex points can be compared by
/// perpendicular distance.
fn normalize_fitness(
    fitness: ArrayView1<f64>,
    ideal: &Array1<f64>,
    nadir: &Array1<f64>,
) -> Array1<f64> {
    let mut fnorm = Array1::zeros(fitness.len());
    for (i, f) in fnorm.iter_mut().enumerate() {
        *f = (ideal[i] - fitness[i]) / (ideal[i] - nadir[i]).max(MIN_SPREAD);
    }
    fnorm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FitnessStats;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn run_info<'a>(fmat: &'a FitnessMatrix, stats: &'a FitnessStats, n: usize) -> RunInfo<'a> {
        RunInfo {
            generation: 0,
            max_generations: 100,
            population_size: n,
            num_objectives: fmat.ncols(),
            num_fitness_evals: 0,
            fitness_matrix: fmat,
            stats,
        }
    }

    #[test]
    fn test_reference_points_lie_on_the_simplex() {
        for &(count, dim) in &[(1, 2), (10, 2), (50, 3), (100, 5)] {
            let points = generate_reference_points(count, dim);
            assert_eq!(points.len(), count);
            for point in &points {
                assert_eq!(point.len(), dim);
                assert!(point.iter().all(|&x| x >= 0.0));
                assert_abs_diff_eq!(point.sum(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_single_objective_runs_are_rejected() {
        let fmat = array![[1.0], [2.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 2);

        let mut nsga3 = Nsga3::new();
        assert!(matches!(
            nsga3.init(&info),
            Err(EvolveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_normalization_maps_ideal_to_origin() {
        let ideal = array![4.0, 2.0];
        let nadir = array![0.0, 0.0];

        let at_ideal = normalize_fitness(ideal.view(), &ideal, &nadir);
        assert_abs_diff_eq!(at_ideal[0], 0.0);
        assert_abs_diff_eq!(at_ideal[1], 0.0);

        let worse = normalize_fitness(array![0.0, 0.0].view(), &ideal, &nadir);
        assert_abs_diff_eq!(worse[0], 1.0);
        assert_abs_diff_eq!(worse[1], 1.0);
    }

    #[test]
    fn test_normalization_survives_zero_spread() {
        // ideal == nadir on the second axis; the spread floor keeps the
        // result finite.
        let ideal = array![4.0, 2.0];
        let nadir = array![0.0, 2.0];
        let fnorm = normalize_fitness(array![2.0, 2.0].view(), &ideal, &nadir);
        assert!(fnorm.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_extreme_points_track_the_axes() {
        let fmat = array![[10.0, 0.0], [0.0, 10.0], [5.0, 5.0]];
        let ideal = column_max(&fmat);
        let mut extremes = Vec::new();
        update_extreme_points(&mut extremes, &fmat, &ideal);

        assert_eq!(extremes.len(), 2);
        // The axis-0 extreme is the candidate closest to the f0 axis in ASF
        // terms, which is (10, 0); analogously for axis 1.
        assert_eq!(extremes[0], array![10.0, 0.0]);
        assert_eq!(extremes[1], array![0.0, 10.0]);

        let nadir = find_nadir_point(&extremes);
        assert_eq!(nadir, array![0.0, 0.0]);
    }

    #[test]
    fn test_init_associates_every_candidate() {
        let fmat = array![
            [1.0, 0.0],
            [0.8, 0.2],
            [0.5, 0.5],
            [0.2, 0.8],
            [0.0, 1.0],
        ];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 5);

        let mut nsga3 = Nsga3::new();
        nsga3.init(&info).unwrap();

        assert_eq!(nsga3.ref_points.len(), 5);
        assert_eq!(nsga3.sol_info.len(), 5);
        let total: usize = nsga3.niche_counts.iter().sum();
        assert_eq!(total, 5);
        assert!(nsga3.sol_info.iter().all(|s| s.ref_idx < 5));
    }

    #[test]
    fn test_next_population_has_the_requested_size() {
        let fmat = array![
            [1.0, 0.0],
            [0.8, 0.2],
            [0.5, 0.5],
            [0.2, 0.8],
        ];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 4);

        let mut nsga3 = Nsga3::new();
        nsga3.init(&info).unwrap();

        // Combined pool of parents and children; front 0 has 6 candidates,
        // so the niching step must pick 4 of them.
        let combined = array![
            [1.0, 0.0],
            [0.8, 0.2],
            [0.5, 0.5],
            [0.2, 0.8],
            [0.0, 1.0],
            [0.9, 0.1],
            [0.1, 0.1],
            [0.05, 0.0],
        ];
        let survivors = nsga3.next_population(&info, &combined);

        assert_eq!(survivors.len(), 4);
        // Only non-dominated candidates survive.
        assert!(survivors.iter().all(|&idx| idx < 6));
        assert_eq!(nsga3.sol_info.len(), 4);
        let selected: usize = nsga3.niche_counts.iter().sum();
        assert_eq!(selected, 4);
    }

    #[test]
    fn test_select_prefers_lower_ranks() {
        let fmat = array![
            [1.0, 0.0],
            [0.0, 1.0],
            [0.1, 0.1],
            [0.01, 0.01],
        ];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 4);

        let mut nsga3 = Nsga3::new();
        nsga3.init(&info).unwrap();

        let mut wins = [0usize; 4];
        for _ in 0..4000 {
            wins[nsga3.select(&info, &fmat)] += 1;
        }
        assert!(wins[0] + wins[1] > wins[2] + wins[3]);
    }
}
