use crate::error::EvolveError;
use crate::genetic::{Chromosome, Gene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::mutation::Mutation;
use crate::random;

/// Swap mutation: with probability `rate` two distinct positions of the
/// chromosome exchange their genes. Keeps permutations valid.
#[derive(Debug, Clone)]
pub struct SwapMutation {
    rate: Probability,
}

impl SwapMutation {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for SwapMutation {
    fn name(&self) -> String {
        "SwapMutation".into()
    }
}

impl<G: Gene> Mutation<G> for SwapMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<G>) {
        if chromosome.len() < 2 || !random::random_bool_with(self.rate.get()) {
            return;
        }

        let positions = random::sample_unique(0, chromosome.len(), 2);
        chromosome.swap(positions[0], positions[1]);
    }
}
