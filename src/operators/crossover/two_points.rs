use crate::error::EvolveError;
use crate::genetic::{Chromosome, Gene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::crossover::Crossover;
use crate::random;

/// Two-point crossover: the gene segment between two random cut points is
/// exchanged between the parents.
#[derive(Debug, Clone)]
pub struct TwoPointCrossover {
    rate: Probability,
}

impl TwoPointCrossover {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for TwoPointCrossover {
    fn name(&self) -> String {
        "TwoPointCrossover".into()
    }
}

impl<G: Gene> Crossover<G> for TwoPointCrossover {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn cross(&self, parent_a: &[G], parent_b: &[G]) -> (Chromosome<G>, Chromosome<G>) {
        let len = parent_a.len();
        if len < 2 {
            return (parent_a.to_vec(), parent_b.to_vec());
        }

        let mut cuts = random::sample_unique(0, len + 1, 2);
        cuts.sort_unstable();
        let (first, last) = (cuts[0], cuts[1]);

        let mut child_a = parent_a.to_vec();
        let mut child_b = parent_b.to_vec();
        for i in first..last {
            child_a[i] = parent_b[i].clone();
            child_b[i] = parent_a[i].clone();
        }

        (child_a, child_b)
    }
}
