//! # `selection` – Parent selection and replacement
//!
//! The [`Selection`] trait covers both halves of the environmental loop:
//! picking parents (`select`) and picking the survivors of the next
//! generation from the union of parents and children (`next_population`).
//!
//! Life-cycle relative to the driver:
//!
//! 1. [`Selection::init`] once, after the initial population is evaluated;
//! 2. [`Selection::prepare`] once per generation, before any `select` call;
//! 3. [`Selection::select`] 2·N times per generation, possibly in parallel —
//!    implementations must be pure with respect to `&self`;
//! 4. [`Selection::next_population`] once per generation on the combined
//!    2N-candidate fitness matrix.
//!
//! Single-objective schemes live in [`single`], the multi-objective engines
//! in [`nsga2`] and [`nsga3`].

pub mod common;
pub mod nsga2;
pub mod nsga3;
pub mod single;

pub use nsga2::Nsga2;
pub use nsga3::Nsga3;
pub use single::{Boltzmann, Rank, Replacement, Roulette, Sigma, Tournament};

use crate::context::RunInfo;
use crate::error::EvolveError;
use crate::genetic::FitnessMatrix;
use crate::operators::GeneticOperator;

/// Selects parents during a generation and survivors at its end.
pub trait Selection: GeneticOperator + Send + Sync {
    /// Called once after the initial population has been evaluated.
    fn init(&mut self, _info: &RunInfo) -> Result<(), EvolveError> {
        Ok(())
    }

    /// Called once per generation before any `select` call.
    fn prepare(&mut self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) {}

    /// Select the index of one parent from the population. Called 2·N times
    /// per generation, potentially from multiple threads.
    fn select(&self, info: &RunInfo, fitness_matrix: &FitnessMatrix) -> usize;

    /// Select the indices of the N survivors from the combined fitness
    /// matrix of parents and children.
    ///
    /// The default implementation keeps the best Pareto fronts: candidates
    /// are ordered by dominance rank with a stable sort, so ties keep their
    /// positional order, and the first N are taken.
    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        let ranks = common::non_dominated_sort(combined).ranks;

        let mut indices: Vec<usize> = (0..combined.nrows()).collect();
        indices.sort_by_key(|&idx| ranks[idx]);
        indices.truncate(info.population_size);
        indices
    }
}
