//! Single-objective selection schemes and their replacement policies.
//!
//! A single-objective algorithm is a selection scheme plus a
//! [`Replacement`] policy. The cdf-based schemes build their cdf once per
//! generation in `prepare` and sample it in `select`; tournament selection
//! samples the population directly. All schemes assume fitness
//! maximization over a scalar (single column) fitness matrix.

use crate::context::RunInfo;
use crate::error::EvolveError;
use crate::genetic::FitnessMatrix;
use crate::operators::GeneticOperator;
use crate::operators::selection::{Selection, common};
use crate::random;

/// How the survivors of a generation are picked from the 2N-candidate
/// union of parents and children.
#[derive(Debug, Clone)]
pub enum Replacement {
    /// The children replace the parents wholesale.
    KeepChildren,
    /// The N best of parents and children by scalar fitness survive.
    KeepBest,
    /// The best k parents survive along with the first N - k children.
    Elitism(usize),
}

impl Replacement {
    fn select_survivors(&self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        let n = info.population_size;
        let total = combined.nrows();
        debug_assert!(total >= n);

        match self {
            Replacement::KeepChildren => (n..total).take(n).collect(),
            Replacement::KeepBest => {
                let fitness = common::scalar_fitness(combined);
                let mut indices: Vec<usize> = (0..total).collect();
                indices.sort_by(|&a, &b| {
                    fitness[b]
                        .partial_cmp(&fitness[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                indices.truncate(n);
                indices
            }
            Replacement::Elitism(k) => {
                let k = (*k).min(n);
                let fitness = common::scalar_fitness(combined);
                let mut parents: Vec<usize> = (0..n).collect();
                parents.sort_by(|&a, &b| {
                    fitness[b]
                        .partial_cmp(&fitness[a])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let mut survivors: Vec<usize> = parents.into_iter().take(k).collect();
                survivors.extend((n..total).take(n - k));
                survivors
            }
        }
    }
}

/// Fitness-proportional (roulette-wheel) selection, with the weights
/// shifted so negative fitness values are handled too.
#[derive(Debug, Clone)]
pub struct Roulette {
    replacement: Replacement,
    cdf: Vec<f64>,
}

impl Roulette {
    pub fn new() -> Self {
        Self::with_replacement(Replacement::KeepBest)
    }

    pub fn with_replacement(replacement: Replacement) -> Self {
        Self {
            replacement,
            cdf: Vec::new(),
        }
    }
}

impl Default for Roulette {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneticOperator for Roulette {
    fn name(&self) -> String {
        "Roulette".into()
    }
}

impl Selection for Roulette {
    fn prepare(&mut self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) {
        let weights = common::roulette_weights(&common::scalar_fitness(fitness_matrix));
        self.cdf = common::weights_to_cdf(&weights);
    }

    fn select(&self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) -> usize {
        random::sample_cdf(&self.cdf)
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        self.replacement.select_survivors(info, combined)
    }
}

/// Rank selection: weights are interpolated between `min_weight` and
/// `max_weight` over the fitness-ranked population.
#[derive(Debug, Clone)]
pub struct Rank {
    min_weight: f64,
    max_weight: f64,
    replacement: Replacement,
    cdf: Vec<f64>,
}

impl Rank {
    pub fn new(min_weight: f64, max_weight: f64) -> Result<Self, EvolveError> {
        if !(0.0 <= min_weight && min_weight <= max_weight && max_weight.is_finite()) {
            return Err(EvolveError::InvalidArgument(format!(
                "rank selection weights must satisfy 0 <= min <= max, got [{min_weight}, {max_weight}]"
            )));
        }
        Ok(Self {
            min_weight,
            max_weight,
            replacement: Replacement::KeepBest,
            cdf: Vec::new(),
        })
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }
}

impl GeneticOperator for Rank {
    fn name(&self) -> String {
        "Rank".into()
    }
}

impl Selection for Rank {
    fn prepare(&mut self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) {
        let weights = common::rank_weights(
            &common::scalar_fitness(fitness_matrix),
            self.min_weight,
            self.max_weight,
        );
        self.cdf = common::weights_to_cdf(&weights);
    }

    fn select(&self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) -> usize {
        random::sample_cdf(&self.cdf)
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        self.replacement.select_survivors(info, combined)
    }
}

/// Tournament selection: `size` candidates are sampled uniformly without
/// replacement and the best one wins.
#[derive(Debug, Clone)]
pub struct Tournament {
    size: usize,
    replacement: Replacement,
    fitness: Vec<f64>,
}

impl Tournament {
    pub fn new(size: usize) -> Result<Self, EvolveError> {
        if size < 2 {
            return Err(EvolveError::InvalidArgument(format!(
                "the tournament size must be at least 2, got {size}"
            )));
        }
        Ok(Self {
            size,
            replacement: Replacement::KeepBest,
            fitness: Vec::new(),
        })
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }
}

impl GeneticOperator for Tournament {
    fn name(&self) -> String {
        "Tournament".into()
    }
}

impl Selection for Tournament {
    fn prepare(&mut self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) {
        self.fitness = common::scalar_fitness(fitness_matrix);
    }

    fn select(&self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) -> usize {
        let size = self.size.min(self.fitness.len());
        let contestants = random::sample_unique(0, self.fitness.len(), size);

        contestants
            .into_iter()
            .max_by(|&a, &b| {
                self.fitness[a]
                    .partial_cmp(&self.fitness[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("the tournament is not empty")
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        self.replacement.select_survivors(info, combined)
    }
}

/// Sigma-scaled selection with scale parameter `c >= 1`.
#[derive(Debug, Clone)]
pub struct Sigma {
    scale: f64,
    replacement: Replacement,
    cdf: Vec<f64>,
}

impl Sigma {
    pub fn new(scale: f64) -> Result<Self, EvolveError> {
        if !(scale >= 1.0 && scale.is_finite()) {
            return Err(EvolveError::InvalidArgument(format!(
                "the sigma selection scale must be at least 1, got {scale}"
            )));
        }
        Ok(Self {
            scale,
            replacement: Replacement::KeepBest,
            cdf: Vec::new(),
        })
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }
}

impl GeneticOperator for Sigma {
    fn name(&self) -> String {
        "Sigma".into()
    }
}

impl Selection for Sigma {
    fn prepare(&mut self, _info: &RunInfo, fitness_matrix: &FitnessMatrix) {
        let weights = common::sigma_weights(&common::scalar_fitness(fitness_matrix), self.scale);
        self.cdf = common::weights_to_cdf(&weights);
    }

    fn select(&self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) -> usize {
        random::sample_cdf(&self.cdf)
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        self.replacement.select_survivors(info, combined)
    }
}

/// The default Boltzmann temperature schedule: a sigmoid ramp from about
/// 4.06 at the start of the run down to about 0.25 at its end, so the
/// selection pressure grows as the run progresses.
pub fn default_temperature(generation: usize, max_generations: usize) -> f64 {
    let t = generation as f64 / max_generations as f64;
    -4.0 / (1.0 + f64::exp(-10.0 * t + 3.0)) + 4.0 + 0.25
}

/// Boltzmann selection with a generation-dependent temperature schedule.
#[derive(Debug, Clone)]
pub struct Boltzmann {
    temperature: fn(usize, usize) -> f64,
    replacement: Replacement,
    cdf: Vec<f64>,
}

impl Boltzmann {
    pub fn new() -> Self {
        Self::with_temperature(default_temperature)
    }

    pub fn with_temperature(temperature: fn(usize, usize) -> f64) -> Self {
        Self {
            temperature,
            replacement: Replacement::KeepBest,
            cdf: Vec::new(),
        }
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }
}

impl Default for Boltzmann {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneticOperator for Boltzmann {
    fn name(&self) -> String {
        "Boltzmann".into()
    }
}

impl Selection for Boltzmann {
    fn prepare(&mut self, info: &RunInfo, fitness_matrix: &FitnessMatrix) {
        let temperature = (self.temperature)(info.generation, info.max_generations);
        let weights =
            common::boltzmann_weights(&common::scalar_fitness(fitness_matrix), temperature);
        self.cdf = common::weights_to_cdf(&weights);
    }

    fn select(&self, _info: &RunInfo, _fitness_matrix: &FitnessMatrix) -> usize {
        random::sample_cdf(&self.cdf)
    }

    fn next_population(&mut self, info: &RunInfo, combined: &FitnessMatrix) -> Vec<usize> {
        self.replacement.select_survivors(info, combined)
    }
}
