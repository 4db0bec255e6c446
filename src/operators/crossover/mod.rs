//! # `crossover` – Recombination operators
//!
//! A [`Crossover`] holds a crossover rate `p_c` and produces two children
//! from two parents. With probability `1 - p_c` the parents are passed
//! through unchanged, fitness included; otherwise the operator-specific
//! [`Crossover::cross`] recombines the chromosomes. A child whose
//! chromosome equals one of its evaluated parents inherits that parent's
//! fitness so the driver can skip its evaluation.

mod arithmetic;
mod order;
mod single_point;
mod two_points;
mod uniform;

pub use arithmetic::ArithmeticCrossover;
pub use order::OrderCrossover;
pub use single_point::SinglePointCrossover;
pub use two_points::TwoPointCrossover;
pub use uniform::UniformCrossover;

use crate::error::EvolveError;
use crate::genetic::{Candidate, Chromosome, Gene, Probability, chromosomes_equal};
use crate::operators::GeneticOperator;
use crate::random;

/// Recombines two parents into two children of the same chromosome length.
pub trait Crossover<G: Gene>: GeneticOperator + Send + Sync {
    /// The crossover rate of the operator.
    fn rate(&self) -> Probability;

    /// Recombine two parent chromosomes. Only called when the crossover
    /// rate check passed.
    fn cross(&self, parent_a: &[G], parent_b: &[G]) -> (Chromosome<G>, Chromosome<G>);

    /// Apply the operator to a pair of parents, respecting the crossover
    /// rate and reusing parent fitness for unchanged children.
    fn operate(
        &self,
        parent_a: &Candidate<G>,
        parent_b: &Candidate<G>,
    ) -> Result<(Candidate<G>, Candidate<G>), EvolveError> {
        if !random::random_bool_with(self.rate().get()) {
            return Ok((parent_a.clone(), parent_b.clone()));
        }

        let (child_a, child_b) = self.cross(&parent_a.chromosome, &parent_b.chromosome);
        if child_a.len() != parent_a.chromosome.len()
            || child_b.len() != parent_b.chromosome.len()
        {
            return Err(EvolveError::ContractViolation(format!(
                "the crossover operator {} changed the chromosome length",
                self.name()
            )));
        }

        Ok((
            inherit_fitness(child_a, parent_a, parent_b),
            inherit_fitness(child_b, parent_a, parent_b),
        ))
    }
}

/// Wrap a child chromosome into a candidate, reusing a parent's fitness
/// when the chromosome came through the recombination unchanged.
fn inherit_fitness<G: Gene>(
    chromosome: Chromosome<G>,
    parent_a: &Candidate<G>,
    parent_b: &Candidate<G>,
) -> Candidate<G> {
    if parent_a.evaluated && chromosomes_equal(&chromosome, &parent_a.chromosome) {
        Candidate::with_fitness(chromosome, parent_a.fitness.clone())
    } else if parent_b.evaluated && chromosomes_equal(&chromosome, &parent_b.chromosome) {
        Candidate::with_fitness(chromosome, parent_b.fitness.clone())
    } else {
        Candidate::new(chromosome)
    }
}
