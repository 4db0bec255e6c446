use crate::error::EvolveError;
use crate::genetic::{Chromosome, Gene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::crossover::Crossover;
use crate::random;

/// Uniform crossover: at every position the genes of the two parents are
/// swapped with probability 1/2, independently of the other positions.
#[derive(Debug, Clone)]
pub struct UniformCrossover {
    rate: Probability,
}

impl UniformCrossover {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for UniformCrossover {
    fn name(&self) -> String {
        "UniformCrossover".into()
    }
}

impl<G: Gene> Crossover<G> for UniformCrossover {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn cross(&self, parent_a: &[G], parent_b: &[G]) -> (Chromosome<G>, Chromosome<G>) {
        let mut child_a = parent_a.to_vec();
        let mut child_b = parent_b.to_vec();

        for i in 0..child_a.len() {
            if random::random_bool() {
                std::mem::swap(&mut child_a[i], &mut child_b[i]);
            }
        }

        (child_a, child_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_are_gene_wise_complementary() {
        let op = UniformCrossover::new(1.0).unwrap();
        let a = vec![0_i64; 100];
        let b = vec![1_i64; 100];

        let (child_a, child_b) = op.cross(&a, &b);
        for (x, y) in child_a.iter().zip(child_b.iter()) {
            assert_eq!(x + y, 1);
        }
        // With 100 fair coin flips, both outcomes almost surely occur.
        assert!(child_a.iter().any(|&g| g == 0));
        assert!(child_a.iter().any(|&g| g == 1));
    }
}
