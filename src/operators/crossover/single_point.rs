use crate::error::EvolveError;
use crate::genetic::{Chromosome, Gene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::crossover::Crossover;
use crate::random;

/// Single-point crossover: the chromosomes are cut at one random locus and
/// the tails are exchanged. Works with any encoding whose genes are
/// position-independent (binary, real, integer).
#[derive(Debug, Clone)]
pub struct SinglePointCrossover {
    rate: Probability,
}

impl SinglePointCrossover {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for SinglePointCrossover {
    fn name(&self) -> String {
        "SinglePointCrossover".into()
    }
}

impl<G: Gene> Crossover<G> for SinglePointCrossover {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn cross(&self, parent_a: &[G], parent_b: &[G]) -> (Chromosome<G>, Chromosome<G>) {
        let len = parent_a.len();
        if len < 2 {
            return (parent_a.to_vec(), parent_b.to_vec());
        }

        let point = random::random_int(1, len - 1);

        let mut child_a = parent_a[..point].to_vec();
        child_a.extend_from_slice(&parent_b[point..]);
        let mut child_b = parent_b[..point].to_vec();
        child_b.extend_from_slice(&parent_a[point..]);

        (child_a, child_b)
    }
}
