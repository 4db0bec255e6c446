//! NSGA-II: non-dominated sorting with crowding-distance diversity
//! preservation.
//!
//! Implementation of K. Deb et al., "A fast and elitist multiobjective
//! genetic algorithm: NSGA-II", IEEE Transactions on Evolutionary
//! Computation 6 (2): 182-197 (2002).

use crate::context::RunInfo;
use crate::error::EvolveError;
use crate::genetic::FitnessMatrix;
use crate::operators::GeneticOperator;
use crate::operators::selection::{Selection, common};
use crate::random;

/// The NSGA-II selection strategy. Parents are picked by a binary
/// tournament on (rank, crowding distance); survivors are whole Pareto
/// fronts plus the most crowded-out prefix of the splitting front.
#[derive(Debug, Clone, Default)]
pub struct Nsga2 {
    ranks: Vec<usize>,
    dists: Vec<f64>,
}

impl Nsga2 {
    pub fn new() -> Self {
        Self::default()
    }

    /// The crowded-compare operator: lower rank wins, ties go to the
    /// candidate with the larger crowding distance.
    fn crowded_compare(&self, lhs: usize, rhs: usize) -> bool {
        if self.ranks[lhs] != self.ranks[rhs] {
            self.ranks[lhs] < self.ranks[rhs]
        } else {
            self.dists[lhs] > self.dists[rhs]
        }
    }
}

impl GeneticOperator for Nsga2 {
    fn name(&self) -> String {
        "NSGA-II".into()
    }
}

impl Selection for Nsga2 {
    fn init(&mut self, info: &RunInfo) -> Result<(), EvolveError> {
        if info.num_objectives < 2 {
            return Err(EvolveError::InvalidArgument(
                "NSGA-II requires at least 2 objectives".into(),
            ));
        }

        let mut sorted = common::non_dominated_sort(info.fitness_matrix);
        self.dists = common::crowding_distances(info.fitness_matrix, &mut sorted.fronts);
        self.ranks = sorted.ranks;
        Ok(())
    }

    fn select(&self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) -> usize {
        debug_assert_eq!(fitness_matrix.nrows(), self.ranks.len());

        let first = random::random_index(fitness_matrix.nrows());
        let second = random::random_index(fitness_matrix.nrows());

        if self.crowded_compare(first, second) { first } else { second }
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        let n = info.population_size;
        debug_assert!(combined.nrows() >= n);

        let mut sorted = common::non_dominated_sort(combined);
        let dists = common::crowding_distances(combined, &mut sorted.fronts);
        let ranks = sorted.ranks;

        let mut new_pop = Vec::with_capacity(n);
        let mut new_ranks = Vec::with_capacity(n);
        let mut new_dists = Vec::with_capacity(n);

        for front in &sorted.fronts {
            if new_pop.len() + front.len() <= n {
                // The entire front fits.
                for &idx in front {
                    new_pop.push(idx);
                    new_ranks.push(ranks[idx]);
                    new_dists.push(dists[idx]);
                }
                continue;
            }

            let remaining = n - new_pop.len();
            if remaining > 0 {
                // Truncate the splitting front by descending crowding
                // distance, then recompute the distances within the
                // truncated front so they reflect the reduced set.
                let mut partial = front.clone();
                partial.sort_by(|&a, &b| {
                    dists[b].partial_cmp(&dists[a]).unwrap_or(std::cmp::Ordering::Equal)
                });
                partial.truncate(remaining);

                let mut partial_fronts = [partial.clone()];
                let partial_dists = common::crowding_distances(combined, &mut partial_fronts);

                for &idx in &partial {
                    new_pop.push(idx);
                    new_ranks.push(ranks[idx]);
                    new_dists.push(partial_dists[idx]);
                }
            }
            break;
        }

        self.ranks = new_ranks;
        self.dists = new_dists;
        new_pop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FitnessStats;
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
    fn test_init_rejects_single_objective_runs() {
        let fmat = array![[1.0], [2.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 2);

        let mut nsga2 = Nsga2::new();
        assert!(matches!(
            nsga2.init(&info),
            Err(EvolveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_select_prefers_lower_ranks() {
        // Candidate 0 dominates everything, candidate 3 is dominated by all.
        let fmat = array![[4.0, 4.0], [3.0, 1.0], [1.0, 3.0], [0.0, 0.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        let info = run_info(&fmat, &stats, 4);

        let mut nsga2 = Nsga2::new();
        nsga2.init(&info).unwrap();

        let mut wins = [0usize; 4];
        for _ in 0..4000 {
            wins[nsga2.select(&info, &fmat)] += 1;
        }
        assert!(wins[0] > wins[3]);
        assert!(wins[1] > wins[3]);
    }

    #[test]
    fn test_next_population_takes_whole_fronts_first() {
        // Front 0: 0, 1. Front 1: 2, 3. Front 2: 4, 5.
        let combined = array![
            [5.0, 1.0],
            [1.0, 5.0],
            [3.0, 0.5],
            [0.5, 3.0],
            [0.2, 0.2],
            [0.1, 0.1],
        ];
        let stats = FitnessStats::from_matrix(&combined);
        let info = run_info(&combined, &stats, 4);

        let mut nsga2 = Nsga2::new();
        let mut survivors = nsga2.next_population(&info, &combined);
        survivors.sort_unstable();
        assert_eq!(survivors, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_splitting_front_keeps_the_least_crowded() {
        // One front of five candidates on a line; three survive. The
        // extremes have infinite crowding distance, so they must be kept.
        let combined = array![
            [0.0, 4.0],
            [1.0, 3.0],
            [2.0, 2.0],
            [3.0, 1.0],
            [4.0, 0.0],
        ];
        let stats = FitnessStats::from_matrix(&combined);
        let info = run_info(&combined, &stats, 3);

        let mut nsga2 = Nsga2::new();
        let survivors = nsga2.next_population(&info, &combined);
        assert_eq!(survivors.len(), 3);
        assert!(survivors.contains(&0));
        assert!(survivors.contains(&4));
    }

    #[test]
    fn test_bookkeeping_matches_the_new_population() {
        let combined = array![
            [5.0, 1.0],
            [1.0, 5.0],
            [3.0, 0.5],
            [0.5, 3.0],
            [0.2, 0.2],
            [0.1, 0.1],
        ];
        let stats = FitnessStats::from_matrix(&combined);
        let info = run_info(&combined, &stats, 4);

        let mut nsga2 = Nsga2::new();
        let survivors = nsga2.next_population(&info, &combined);
        assert_eq!(nsga2.ranks.len(), survivors.len());
        assert_eq!(nsga2.dists.len(), survivors.len());
        // The survivors from front 0 come first with rank 0.
        assert_eq!(nsga2.ranks[0], 0);
        assert_eq!(nsga2.ranks[2], 1);
    }
}
