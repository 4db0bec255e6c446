use crate::error::EvolveError;
use crate::genetic::{Chromosome, Gene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::mutation::Mutation;
use crate::random;

/// Inversion mutation: with probability `rate` the gene segment between two
/// random cut points is reversed. The classic permutation move (a 2-opt
/// step for tour-like problems), but valid for any encoding.
#[derive(Debug, Clone)]
pub struct InversionMutation {
    rate: Probability,
}

impl InversionMutation {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for InversionMutation {
    fn name(&self) -> String {
        "InversionMutation".into()
    }
}

impl<G: Gene> Mutation<G> for InversionMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<G>) {
        if chromosome.len() < 2 || !random::random_bool_with(self.rate.get()) {
            return;
        }

        let mut cuts = random::sample_unique(0, chromosome.len() + 1, 2);
        cuts.sort_unstable();
        chromosome[cuts[0]..cuts[1]].reverse();
    }
}
