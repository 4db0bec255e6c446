//! # `evaluator` – From chromosomes to fitness vectors
//!
//! The [`Evaluator`] is the point where the user-supplied fitness function
//! meets the core data structures. It owns the duplicate-aware
//! [`FifoCache`] and runs the actual evaluations data-parallel over the
//! candidates with `rayon`.
//!
//! Cache access is single-writer: hits are resolved serially before the
//! parallel pass, new results are written back serially after it. Duplicate
//! chromosomes within one generation are grouped first so each unique
//! chromosome is evaluated exactly once.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::cache::FifoCache;
use crate::error::EvolveError;
use crate::genetic::{Candidate, Chromosome, FitnessVector, Gene};

/// The fitness function of a run: maps a chromosome to a fitness vector of
/// fixed length M >= 1, every entry finite, maximization convention.
///
/// Must be a pure function of the chromosome unless the run is declared
/// dynamic, in which case caching is disabled and every candidate is
/// re-evaluated each generation.
pub trait FitnessFn<G: Gene>: Send + Sync {
    fn evaluate(&self, chromosome: &[G]) -> FitnessVector;
}

impl<G, F> FitnessFn<G> for F
where
    G: Gene,
    F: Fn(&[G]) -> FitnessVector + Send + Sync,
{
    fn evaluate(&self, chromosome: &[G]) -> FitnessVector {
        self(chromosome)
    }
}

/// Cache key wrapping a chromosome with gene-aware hashing and equality.
#[derive(Debug, Clone)]
pub struct ChromosomeKey<G: Gene>(pub Chromosome<G>);

impl<G: Gene> PartialEq for ChromosomeKey<G> {
    fn eq(&self, other: &Self) -> bool {
        crate::genetic::chromosomes_equal(&self.0, &other.0)
    }
}

impl<G: Gene> Eq for ChromosomeKey<G> {}

impl<G: Gene> Hash for ChromosomeKey<G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        for gene in &self.0 {
            gene.hash_gene(state);
        }
    }
}

#[derive(Debug)]
pub struct Evaluator<G: Gene, F: FitnessFn<G>> {
    fitness_fn: F,
    cache: FifoCache<ChromosomeKey<G>, FitnessVector>,
    dynamic: bool,
    num_evals: AtomicU64,
}

impl<G: Gene, F: FitnessFn<G>> Evaluator<G, F> {
    /// Create an evaluator with the given cache capacity. Declaring the
    /// fitness function dynamic disables the cache.
    pub fn new(fitness_fn: F, cache_capacity: usize, dynamic: bool) -> Self {
        let capacity = if dynamic { 0 } else { cache_capacity };
        Self {
            fitness_fn,
            cache: FifoCache::new(capacity),
            dynamic,
            num_evals: AtomicU64::new(0),
        }
    }

    /// The number of fitness function invocations performed so far.
    pub fn num_evals(&self) -> u64 {
        self.num_evals.load(Ordering::Relaxed)
    }

    /// Evaluate a single chromosome outside the usual bookkeeping. Used by
    /// the driver to learn the objective count of the run.
    pub fn probe(&self, chromosome: &[G]) -> FitnessVector {
        self.fitness_fn.evaluate(chromosome)
    }

    /// Evaluate every unevaluated candidate of the population in parallel,
    /// consulting and updating the cache, then validate the results.
    pub fn evaluate_population(
        &mut self,
        population: &mut [Candidate<G>],
        num_objectives: usize,
    ) -> Result<(), EvolveError> {
        if self.dynamic {
            // Re-evaluate everything; duplicates are not merged since a
            // dynamic fitness function may be non-deterministic.
            let fitness_fn = &self.fitness_fn;
            let num_evals = &self.num_evals;
            population.par_iter_mut().for_each(|candidate| {
                candidate.fitness = fitness_fn.evaluate(&candidate.chromosome);
                candidate.evaluated = true;
                num_evals.fetch_add(1, Ordering::Relaxed);
            });
        } else {
            // Resolve cache hits serially before the parallel pass.
            for candidate in population.iter_mut() {
                if !candidate.evaluated {
                    let key = ChromosomeKey(candidate.chromosome.clone());
                    if let Some(fitness) = self.cache.get(&key) {
                        candidate.fitness = fitness.clone();
                        candidate.evaluated = true;
                    }
                }
            }

            // Group the remaining candidates so duplicate chromosomes are
            // evaluated only once.
            let mut groups: HashMap<ChromosomeKey<G>, Vec<usize>> = HashMap::new();
            for (idx, candidate) in population.iter().enumerate() {
                if !candidate.evaluated {
                    groups
                        .entry(ChromosomeKey(candidate.chromosome.clone()))
                        .or_default()
                        .push(idx);
                }
            }
            let pending: Vec<(ChromosomeKey<G>, Vec<usize>)> = groups.into_iter().collect();

            let fitness_fn = &self.fitness_fn;
            let num_evals = &self.num_evals;
            let results: Vec<FitnessVector> = pending
                .par_iter()
                .map(|(key, _)| {
                    num_evals.fetch_add(1, Ordering::Relaxed);
                    fitness_fn.evaluate(&key.0)
                })
                .collect();

            // Write results back and batch them into the cache.
            for ((key, indices), fitness) in pending.into_iter().zip(results) {
                for &idx in &indices {
                    population[idx].fitness = fitness.clone();
                    population[idx].evaluated = true;
                }
                self.cache.try_insert(key, || fitness);
            }
        }

        for candidate in population.iter() {
            if candidate.fitness.len() != num_objectives {
                return Err(EvolveError::DimensionMismatch {
                    what: "fitness vector returned by the fitness function".into(),
                    expected: num_objectives,
                    found: candidate.fitness.len(),
                });
            }
            if !candidate.fitness.iter().all(|x| x.is_finite()) {
                return Err(EvolveError::NumericError(format!(
                    "the fitness function returned a non-finite value: {:?}",
                    candidate.fitness
                )));
            }
        }

        Ok(())
    }
}
