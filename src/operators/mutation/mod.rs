//! # `mutation` – In-place variation operators
//!
//! A [`Mutation`] perturbs one candidate's chromosome in place with a rate
//! `p_m`. The provided [`Mutation::operate`] wrapper keeps the bookkeeping
//! honest: a candidate that was already evaluated keeps its fitness when
//! the mutation leaves the chromosome unchanged, and a mutation that
//! changes the chromosome length is a fatal contract violation.
//!
//! How the rate is interpreted is operator-specific: the per-gene operators
//! (flip, gaussian, uniform) mutate each position independently with
//! probability `p_m`, the permutation operators (swap, inversion) apply one
//! whole-chromosome move with probability `p_m`.

mod flip;
mod gaussian;
mod inversion;
mod swap;
mod uniform;

pub use flip::FlipMutation;
pub use gaussian::GaussMutation;
pub use inversion::InversionMutation;
pub use swap::SwapMutation;
pub use uniform::{UniformIntegerMutation, UniformRealMutation};

use crate::error::EvolveError;
use crate::genetic::{Candidate, Chromosome, Gene, Probability, chromosomes_equal};
use crate::operators::GeneticOperator;

/// Mutates one candidate in place.
pub trait Mutation<G: Gene>: GeneticOperator + Send + Sync {
    /// The mutation rate of the operator.
    fn rate(&self) -> Probability;

    /// Apply the operator-specific perturbation to a chromosome.
    fn mutate_chromosome(&self, chromosome: &mut Chromosome<G>);

    /// Apply the operator to a candidate, preserving its fitness when the
    /// chromosome is left unchanged and checking length invariance.
    fn operate(&self, candidate: &mut Candidate<G>) -> Result<(), EvolveError> {
        let old_chromosome = candidate
            .evaluated
            .then(|| candidate.chromosome.clone());
        let old_len = candidate.chromosome.len();

        self.mutate_chromosome(&mut candidate.chromosome);

        if candidate.chromosome.len() != old_len {
            return Err(EvolveError::ContractViolation(format!(
                "the mutation operator {} changed the chromosome length",
                self.name()
            )));
        }

        if let Some(old_chromosome) = old_chromosome {
            if !chromosomes_equal(&old_chromosome, &candidate.chromosome) {
                candidate.evaluated = false;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[derive(Debug)]
    struct IncrementFirst {
        rate: Probability,
    }

    impl GeneticOperator for IncrementFirst {
        fn name(&self) -> String {
            "IncrementFirst".into()
        }
    }

    impl Mutation<i64> for IncrementFirst {
        fn rate(&self) -> Probability {
            self.rate
        }

        fn mutate_chromosome(&self, chromosome: &mut Chromosome<i64>) {
            if self.rate.get() > 0.0 {
                chromosome[0] += 1;
            }
        }
    }

    #[test]
    fn test_changed_chromosome_clears_the_fitness() {
        let op = IncrementFirst {
            rate: Probability::new(1.0).unwrap(),
        };
        let mut candidate = Candidate::with_fitness(vec![1, 2], array![5.0]);

        op.operate(&mut candidate).unwrap();
        assert_eq!(candidate.chromosome, vec![2, 2]);
        assert!(!candidate.evaluated);
    }

    #[test]
    fn test_unchanged_chromosome_keeps_the_fitness() {
        let op = IncrementFirst {
            rate: Probability::new(0.0).unwrap(),
        };
        let mut candidate = Candidate::with_fitness(vec![1, 2], array![5.0]);

        op.operate(&mut candidate).unwrap();
        assert!(candidate.evaluated);
        assert_eq!(candidate.fitness, array![5.0]);
    }

    #[derive(Debug)]
    struct Truncating;

    impl GeneticOperator for Truncating {
        fn name(&self) -> String {
            "Truncating".into()
        }
    }

    impl Mutation<i64> for Truncating {
        fn rate(&self) -> Probability {
            Probability::new(1.0).unwrap()
        }

        fn mutate_chromosome(&self, chromosome: &mut Chromosome<i64>) {
            chromosome.pop();
        }
    }

    #[test]
    fn test_length_change_is_a_contract_violation() {
        let mut candidate = Candidate::new(vec![1, 2, 3]);
        let err = Truncating.operate(&mut candidate).unwrap_err();
        assert!(matches!(err, EvolveError::ContractViolation(_)));
    }
}
