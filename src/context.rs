//! # `context` – Runtime state shared with the operators
//!
//! [`RunInfo`] is the read-only snapshot of the driver state that selection
//! operators, stop conditions and callbacks receive. It is rebuilt by the
//! driver once per generation together with the per-objective
//! [`FitnessStats`].

use ndarray::{Array1, Axis};

use crate::genetic::FitnessMatrix;

/// Per-objective statistics of a population's fitness matrix.
#[derive(Debug, Clone)]
pub struct FitnessStats {
    pub mean: Array1<f64>,
    pub std_dev: Array1<f64>,
    pub min: Array1<f64>,
    pub max: Array1<f64>,
}

impl FitnessStats {
    pub fn from_matrix(fitness_matrix: &FitnessMatrix) -> Self {
        let (rows, cols) = fitness_matrix.dim();
        if rows == 0 {
            return Self {
                mean: Array1::zeros(cols),
                std_dev: Array1::zeros(cols),
                min: Array1::zeros(cols),
                max: Array1::zeros(cols),
            };
        }

        let mean = fitness_matrix.mean_axis(Axis(0)).expect("rows > 0");
        let mut variance = Array1::zeros(cols);
        for row in fitness_matrix.rows() {
            for (col, &value) in row.iter().enumerate() {
                let diff = value - mean[col];
                variance[col] += diff * diff;
            }
        }
        variance /= rows as f64;

        let min = fitness_matrix.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
        let max = fitness_matrix.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));

        Self {
            mean,
            std_dev: variance.mapv(f64::sqrt),
            min,
            max,
        }
    }
}

/// Read-only information about the state of a run, passed to the selection
/// life-cycle hooks, the stop conditions and the end-of-generation callback.
#[derive(Debug, Clone, Copy)]
pub struct RunInfo<'a> {
    /// The current generation index, starting at 0.
    pub generation: usize,
    /// The hard generation limit of the run.
    pub max_generations: usize,
    /// The number of candidates in the population.
    pub population_size: usize,
    /// The number of objectives of the run.
    pub num_objectives: usize,
    /// The number of fitness evaluations performed so far.
    pub num_fitness_evals: u64,
    /// The fitness matrix of the current population.
    pub fitness_matrix: &'a FitnessMatrix,
    /// Per-objective statistics of the current population.
    pub stats: &'a FitnessStats,
}
