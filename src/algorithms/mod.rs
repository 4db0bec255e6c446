//! # `algorithms` – The evolutionary driver
//!
//! [`GeneticAlgorithm`] orchestrates the whole loop: it owns the
//! population, the operators, the evaluator with its fitness cache and the
//! optional Pareto archive, and runs the generational cycle
//!
//! ```text
//! prepare -> select parents -> crossover -> mutation -> repair?
//!         -> evaluate children -> next_population -> callback -> stop?
//! ```
//!
//! Construction goes through the [`GeneticAlgorithmBuilder`] generated by
//! `derive_builder`, which validates the run configuration before anything
//! is allocated:
//!
//! ```rust,no_run
//! use ndarray::array;
//! use evors::algorithms::GeneticAlgorithmBuilder;
//! use evors::operators::crossover::ArithmeticCrossover;
//! use evors::operators::mutation::GaussMutation;
//! use evors::operators::sampling::RandomRealSampling;
//! use evors::operators::selection::Boltzmann;
//!
//! # fn main() -> Result<(), evors::EvolveError> {
//! let mut ga = GeneticAlgorithmBuilder::default()
//!     .sampler(RandomRealSampling::with_uniform_bounds(0.0, 3.14, 1)?)
//!     .selection(Boltzmann::new())
//!     .crossover(ArithmeticCrossover::new(0.8)?)
//!     .mutation(GaussMutation::with_uniform_bounds(0.1, 0.0, 3.14, 1)?)
//!     .fitness_fn(|x: &[f64]| array![x[0].sin()])
//!     .population_size(100)
//!     .max_generations(500)
//!     .build()?;
//!
//! let solutions = ga.solve()?;
//! # let _ = solutions;
//! # Ok(())
//! # }
//! ```
//!
//! Within a generation the per-candidate work (selection sampling,
//! crossover, mutation, repair, evaluation) is data-parallel over `rayon`;
//! the selection life-cycle hooks and all cache writes run serially.

pub(crate) mod archive;

pub use archive::pareto_front_indices;

use derive_builder::Builder;
use log::{debug, info};
use rayon::prelude::*;

use crate::context::{FitnessStats, RunInfo};
use crate::error::EvolveError;
use crate::evaluator::{Evaluator, FitnessFn};
use crate::genetic::{Candidate, Chromosome, Gene, Population, chromosomes_equal, fitness_matrix};
use crate::operators::{Crossover, Mutation, SamplingOperator, Selection};
use crate::random;
use crate::stopping::StopCondition;

/// An optional hook that maps a chromosome to a repaired chromosome of the
/// same length, applied after mutation.
pub trait RepairFn<G: Gene>: Send + Sync {
    fn repair(&self, chromosome: &[G]) -> Chromosome<G>;
}

impl<G, F> RepairFn<G> for F
where
    G: Gene,
    F: Fn(&[G]) -> Chromosome<G> + Send + Sync,
{
    fn repair(&self, chromosome: &[G]) -> Chromosome<G> {
        self(chromosome)
    }
}

/// The end-of-generation callback type.
pub type GenerationCallback = Box<dyn Fn(&RunInfo) + Send + Sync>;

/// Run configuration of a [`GeneticAlgorithm`], collected by the builder.
#[derive(Builder)]
#[builder(
    pattern = "owned",
    name = "GeneticAlgorithmBuilder",
    build_fn(name = "build_params", validate = "Self::validate", private)
)]
pub struct GeneticAlgorithmParams<G, Sam, Sel, Cross, Mut, F>
where
    G: Gene,
    Sam: SamplingOperator<G>,
    Sel: Selection,
    Cross: Crossover<G>,
    Mut: Mutation<G>,
    F: FitnessFn<G>,
{
    sampler: Sam,
    selection: Sel,
    crossover: Cross,
    mutation: Mut,
    fitness_fn: F,
    #[builder(default = "100")]
    population_size: usize,
    #[builder(default = "500")]
    max_generations: usize,
    #[builder(default = "false")]
    dynamic_fitness: bool,
    #[builder(default = "false")]
    archive_optimal_solutions: bool,
    #[builder(default = "Vec::new()")]
    initial_population: Population<G>,
    #[builder(setter(strip_option), default = "None")]
    cache_capacity: Option<usize>,
    #[builder(setter(strip_option), default = "None")]
    seed: Option<u64>,
    #[builder(setter(strip_option), default = "None")]
    stop_condition: Option<Box<dyn StopCondition>>,
    #[builder(setter(strip_option), default = "None")]
    repair: Option<Box<dyn RepairFn<G>>>,
    #[builder(setter(strip_option), default = "None")]
    on_generation: Option<GenerationCallback>,
}

impl<G, Sam, Sel, Cross, Mut, F> GeneticAlgorithmBuilder<G, Sam, Sel, Cross, Mut, F>
where
    G: Gene,
    Sam: SamplingOperator<G>,
    Sel: Selection,
    Cross: Crossover<G>,
    Mut: Mutation<G>,
    F: FitnessFn<G>,
{
    fn validate(&self) -> Result<(), String> {
        if self.population_size == Some(0) {
            return Err("the population size must be at least 1".into());
        }
        if self.max_generations == Some(0) {
            return Err("the number of generations must be at least 1".into());
        }
        Ok(())
    }

    pub fn build(
        self,
    ) -> Result<GeneticAlgorithm<G, Sam, Sel, Cross, Mut, F>, EvolveError> {
        let params = self
            .build_params()
            .map_err(|e| EvolveError::InvalidArgument(e.to_string()))?;

        // The default cache holds two generations worth of candidates.
        let cache_capacity = params
            .cache_capacity
            .unwrap_or(2 * params.population_size);
        let evaluator = Evaluator::new(params.fitness_fn, cache_capacity, params.dynamic_fitness);

        Ok(GeneticAlgorithm {
            sampler: params.sampler,
            selection: params.selection,
            crossover: params.crossover,
            mutation: params.mutation,
            evaluator,
            repair: params.repair,
            stop_condition: params.stop_condition,
            on_generation: params.on_generation,
            population_size: params.population_size,
            max_generations: params.max_generations,
            archive_enabled: params.archive_optimal_solutions,
            initial_population: params.initial_population,
            seed: params.seed,
            population: Vec::new(),
            solutions: Vec::new(),
            generation: 0,
            num_objectives: 0,
        })
    }
}

/// The evolutionary driver. Owns the population, the solutions archive and
/// the operator objects for the duration of the run.
pub struct GeneticAlgorithm<G, Sam, Sel, Cross, Mut, F>
where
    G: Gene,
    Sam: SamplingOperator<G>,
    Sel: Selection,
    Cross: Crossover<G>,
    Mut: Mutation<G>,
    F: FitnessFn<G>,
{
    sampler: Sam,
    selection: Sel,
    crossover: Cross,
    mutation: Mut,
    evaluator: Evaluator<G, F>,
    repair: Option<Box<dyn RepairFn<G>>>,
    stop_condition: Option<Box<dyn StopCondition>>,
    on_generation: Option<GenerationCallback>,
    population_size: usize,
    max_generations: usize,
    archive_enabled: bool,
    initial_population: Population<G>,
    seed: Option<u64>,
    population: Population<G>,
    solutions: Population<G>,
    generation: usize,
    num_objectives: usize,
}

impl<G, Sam, Sel, Cross, Mut, F> GeneticAlgorithm<G, Sam, Sel, Cross, Mut, F>
where
    G: Gene,
    Sam: SamplingOperator<G>,
    Sel: Selection,
    Cross: Crossover<G>,
    Mut: Mutation<G>,
    F: FitnessFn<G>,
{
    /// The current population of the run.
    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    /// The archived non-dominated solutions (empty unless archiving is
    /// enabled).
    pub fn solutions(&self) -> &Population<G> {
        &self.solutions
    }

    /// The number of generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The number of objectives of the run (0 before `solve`).
    pub fn num_objectives(&self) -> usize {
        self.num_objectives
    }

    /// The number of fitness evaluations performed so far.
    pub fn num_fitness_evals(&self) -> u64 {
        self.evaluator.num_evals()
    }

    /// Run the evolutionary loop and return the solutions found: the
    /// Pareto archive when archiving is enabled, the final population
    /// otherwise.
    pub fn solve(&mut self) -> Result<Population<G>, EvolveError> {
        if let Some(seed) = self.seed {
            random::set_global_seed(seed);
        }

        let chrom_len = self.sampler.chromosome_len();
        if chrom_len == 0 {
            return Err(EvolveError::InvalidArgument(
                "the chromosome length must be at least 1".into(),
            ));
        }

        // Learn the objective count from one probe evaluation; it is
        // pinned for the rest of the run.
        let probe = self.evaluator.probe(&self.sampler.sample_chromosome());
        if probe.is_empty() {
            return Err(EvolveError::DimensionMismatch {
                what: "objective count of the fitness function".into(),
                expected: 1,
                found: 0,
            });
        }
        if !probe.iter().all(|x| x.is_finite()) {
            return Err(EvolveError::NumericError(format!(
                "the fitness function returned a non-finite value: {probe:?}"
            )));
        }
        self.num_objectives = probe.len();
        self.generation = 0;
        self.solutions.clear();

        info!(
            "starting run: population_size={}, chrom_len={}, objectives={}, max_generations={}, selection={}, crossover={}, mutation={}",
            self.population_size,
            chrom_len,
            self.num_objectives,
            self.max_generations,
            self.selection.name(),
            self.crossover.name(),
            self.mutation.name(),
        );

        // The preset population is truncated to size and padded with
        // freshly sampled candidates.
        for candidate in &self.initial_population {
            if candidate.chromosome.len() != chrom_len {
                return Err(EvolveError::DimensionMismatch {
                    what: "chromosome length in the preset population".into(),
                    expected: chrom_len,
                    found: candidate.chromosome.len(),
                });
            }
        }
        let mut population: Population<G> = self
            .initial_population
            .iter()
            .take(self.population_size)
            .cloned()
            .collect();
        while population.len() < self.population_size {
            population.push(Candidate::new(self.sampler.sample_chromosome()));
        }

        self.evaluator
            .evaluate_population(&mut population, self.num_objectives)?;
        self.population = population;

        let mut fmat = fitness_matrix(&self.population);
        let mut stats = FitnessStats::from_matrix(&fmat);

        {
            let init_info = RunInfo {
                generation: self.generation,
                max_generations: self.max_generations,
                population_size: self.population_size,
                num_objectives: self.num_objectives,
                num_fitness_evals: self.evaluator.num_evals(),
                fitness_matrix: &fmat,
                stats: &stats,
            };
            self.selection.init(&init_info)?;
        }

        loop {
            let info = RunInfo {
                generation: self.generation,
                max_generations: self.max_generations,
                population_size: self.population_size,
                num_objectives: self.num_objectives,
                num_fitness_evals: self.evaluator.num_evals(),
                fitness_matrix: &fmat,
                stats: &stats,
            };

            self.selection.prepare(&info, &fmat);
            if self.archive_enabled {
                archive::update_archive(&mut self.solutions, &self.population, self.num_objectives);
            }

            // Parent selection: 2 picks per pair, data-parallel.
            let num_pairs = self.population_size.div_ceil(2);
            let mut children = {
                let selection = &self.selection;
                let crossover = &self.crossover;
                let population = &self.population;

                let pairs: Vec<(usize, usize)> = (0..num_pairs)
                    .into_par_iter()
                    .map(|_| (selection.select(&info, &fmat), selection.select(&info, &fmat)))
                    .collect();

                let child_pairs: Vec<(Candidate<G>, Candidate<G>)> = pairs
                    .par_iter()
                    .map(|&(a, b)| crossover.operate(&population[a], &population[b]))
                    .collect::<Result<_, _>>()?;

                let mut children = Vec::with_capacity(2 * num_pairs);
                for (first, second) in child_pairs {
                    children.push(first);
                    children.push(second);
                }
                children
            };

            // Mutation and repair, data-parallel over the children.
            {
                let mutation = &self.mutation;
                let repair = self.repair.as_deref();
                children.par_iter_mut().try_for_each(|child| {
                    mutation.operate(child)?;
                    if let Some(repair) = repair {
                        let repaired = repair.repair(&child.chromosome);
                        if repaired.len() != chrom_len {
                            return Err(EvolveError::ContractViolation(
                                "the repair function changed the chromosome length".into(),
                            ));
                        }
                        if !chromosomes_equal(&repaired, &child.chromosome) {
                            child.chromosome = repaired;
                            child.evaluated = false;
                        }
                    }
                    Ok(())
                })?;
            }

            self.evaluator
                .evaluate_population(&mut children, self.num_objectives)?;

            // Replacement over the union of parents and children.
            let mut combined = std::mem::take(&mut self.population);
            combined.extend(children);
            let combined_fmat = fitness_matrix(&combined);
            let survivors = self.selection.next_population(&info, &combined_fmat);
            debug_assert_eq!(survivors.len(), self.population_size);
            self.population = survivors
                .into_iter()
                .map(|idx| combined[idx].clone())
                .collect();

            self.generation += 1;

            fmat = fitness_matrix(&self.population);
            stats = FitnessStats::from_matrix(&fmat);
            let end_info = RunInfo {
                generation: self.generation,
                max_generations: self.max_generations,
                population_size: self.population_size,
                num_objectives: self.num_objectives,
                num_fitness_evals: self.evaluator.num_evals(),
                fitness_matrix: &fmat,
                stats: &stats,
            };
            if let Some(callback) = &self.on_generation {
                callback(&end_info);
            }
            debug!(
                "generation {}: evals={}, best={:?}",
                self.generation, end_info.num_fitness_evals, stats.max
            );

            let stop = self.generation >= self.max_generations
                || self
                    .stop_condition
                    .as_mut()
                    .is_some_and(|s| s.evaluate(&end_info));
            if stop {
                break;
            }
        }

        info!(
            "run finished after {} generations and {} fitness evaluations",
            self.generation,
            self.evaluator.num_evals()
        );

        if self.archive_enabled {
            archive::update_archive(&mut self.solutions, &self.population, self.num_objectives);
            Ok(self.solutions.clone())
        } else {
            Ok(self.population.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::crossover::SinglePointCrossover;
    use crate::operators::mutation::UniformIntegerMutation;
    use crate::operators::sampling::RandomIntegerSampling;
    use crate::operators::selection::{Replacement, Tournament};
    use crate::stopping::MaxFitnessEvals;
    use ndarray::{Array1, array};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sum_fitness(chromosome: &[i64]) -> Array1<f64> {
        array![chromosome.iter().sum::<i64>() as f64]
    }

    fn small_ga(
        population_size: usize,
        max_generations: usize,
    ) -> GeneticAlgorithm<
        i64,
        RandomIntegerSampling,
        Tournament,
        SinglePointCrossover,
        UniformIntegerMutation,
        fn(&[i64]) -> Array1<f64>,
    > {
        GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 8).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.05, 10, 0, 8).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(population_size)
            .max_generations(max_generations)
            .seed(12345)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_rejects_zero_sizes() {
        let result = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 8).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.05, 10, 0, 8).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(0)
            .build();
        assert!(matches!(result, Err(EvolveError::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_requires_the_operators() {
        let result: Result<_, _> = GeneticAlgorithmBuilder::<
            i64,
            RandomIntegerSampling,
            Tournament,
            SinglePointCrossover,
            UniformIntegerMutation,
            fn(&[i64]) -> Array1<f64>,
        >::default()
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_population_invariants_hold_after_solve() {
        let mut ga = small_ga(20, 10);
        ga.solve().unwrap();

        assert_eq!(ga.generation(), 10);
        assert_eq!(ga.population().len(), 20);
        for candidate in ga.population() {
            assert!(candidate.evaluated);
            assert_eq!(candidate.fitness.len(), 1);
            assert!(candidate.fitness.iter().all(|x| x.is_finite()));
            assert_eq!(candidate.chromosome.len(), 8);
        }
    }

    #[test]
    fn test_fitness_improves_on_a_trivial_problem() {
        let mut ga = small_ga(50, 50);
        let solutions = ga.solve().unwrap();

        let best = solutions
            .iter()
            .map(|c| c.fitness[0])
            .fold(f64::NEG_INFINITY, f64::max);
        // The optimum is 8 * 9 = 72; 50 elitist generations get close.
        assert!(best >= 60.0, "best fitness {best} too low");
    }

    #[test]
    fn test_preset_population_is_truncated_and_padded() {
        let preset: Population<i64> = (0..5)
            .map(|_| Candidate::new(vec![9_i64; 8]))
            .collect();

        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 8).unwrap())
            .selection(Tournament::new(2).unwrap().with_replacement(Replacement::KeepBest))
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.0, 10, 0, 8).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(10)
            .max_generations(1)
            .seed(7)
            .initial_population(preset)
            .build()
            .unwrap();

        ga.solve().unwrap();
        assert_eq!(ga.population().len(), 10);
        // The preset optimum survives the elitist replacement.
        let best = ga
            .population()
            .iter()
            .map(|c| c.fitness[0])
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(best, 72.0);
    }

    #[test]
    fn test_preset_with_wrong_length_is_rejected() {
        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 8).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.05, 10, 0, 8).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(10)
            .max_generations(1)
            .initial_population(vec![Candidate::new(vec![0_i64; 3])])
            .build()
            .unwrap();
        let err = ga.solve().unwrap_err();
        assert!(matches!(err, EvolveError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_generation_callback_fires_every_generation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);

        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 4).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.05, 10, 0, 4).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(10)
            .max_generations(7)
            .seed(99)
            .on_generation(Box::new(move |info: &RunInfo| {
                seen.fetch_add(1, Ordering::Relaxed);
                assert!(info.generation >= 1);
                assert_eq!(info.population_size, 10);
            }) as GenerationCallback)
            .build()
            .unwrap();

        ga.solve().unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_stop_condition_ends_the_run_early() {
        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 4).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.05, 10, 0, 4).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(10)
            .max_generations(1000)
            .seed(99)
            .stop_condition(Box::new(MaxFitnessEvals::new(50)) as Box<dyn StopCondition>)
            .build()
            .unwrap();

        ga.solve().unwrap();
        assert!(ga.generation() < 1000);
        assert!(ga.num_fitness_evals() >= 50);
    }

    #[test]
    fn test_repair_hook_is_applied() {
        // The repair hook clamps every gene to at most 5; with pure
        // generational replacement the population consists of repaired
        // children only.
        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(10, 0, 4).unwrap())
            .selection(
                Tournament::new(2)
                    .unwrap()
                    .with_replacement(Replacement::KeepChildren),
            )
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.2, 10, 0, 4).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(10)
            .max_generations(5)
            .seed(3)
            .repair(Box::new(|chromosome: &[i64]| {
                chromosome.iter().map(|&g| g.min(5)).collect::<Vec<i64>>()
            }) as Box<dyn RepairFn<i64>>)
            .build()
            .unwrap();

        ga.solve().unwrap();
        for candidate in ga.population() {
            assert!(candidate.evaluated);
            assert!(candidate.chromosome.iter().all(|&g| g <= 5));
        }
    }

    #[test]
    fn test_archive_collects_the_best_scalar_fitness() {
        let mut ga = GeneticAlgorithmBuilder::default()
            .sampler(RandomIntegerSampling::with_alphabet(4, 0, 4).unwrap())
            .selection(Tournament::new(2).unwrap())
            .crossover(SinglePointCrossover::new(0.8).unwrap())
            .mutation(UniformIntegerMutation::with_alphabet(0.1, 4, 0, 4).unwrap())
            .fitness_fn(sum_fitness as fn(&[i64]) -> Array1<f64>)
            .population_size(20)
            .max_generations(30)
            .seed(11)
            .archive_optimal_solutions(true)
            .build()
            .unwrap();

        let solutions = ga.solve().unwrap();
        assert!(!solutions.is_empty());
        // Every archived solution carries the same (maximal) fitness.
        let best = solutions[0].fitness[0];
        for candidate in &solutions {
            assert_eq!(candidate.fitness[0], best);
        }
    }

    #[test]
    fn test_solve_can_be_rerun() {
        let mut ga = small_ga(20, 10);
        ga.solve().unwrap();
        let first_evals = ga.num_fitness_evals();

        // A second solve restarts the generation counter and keeps the
        // population invariants.
        ga.solve().unwrap();
        assert_eq!(ga.generation(), 10);
        assert_eq!(ga.population().len(), 20);
        assert!(ga.num_fitness_evals() >= first_evals);
    }
}
