use crate::error::EvolveError;
use crate::genetic::{BoundsVector, Chromosome, Probability, RealGene, uniform_bounds};
use crate::operators::GeneticOperator;
use crate::operators::mutation::Mutation;
use crate::random;

/// Gaussian mutation for real chromosomes: each gene is perturbed with
/// probability `rate` by a normal draw whose deviation is one sixth of the
/// gene's bound range, then clamped back into the bounds.
#[derive(Debug, Clone)]
pub struct GaussMutation {
    rate: Probability,
    bounds: BoundsVector<RealGene>,
}

impl GaussMutation {
    pub fn new(rate: f64, bounds: BoundsVector<RealGene>) -> Result<Self, EvolveError> {
        if bounds.is_empty() {
            return Err(EvolveError::InvalidArgument(
                "the bounds vector must have at least one entry".into(),
            ));
        }
        Ok(Self {
            rate: Probability::new(rate)?,
            bounds,
        })
    }

    pub fn with_uniform_bounds(
        rate: f64,
        lower: f64,
        upper: f64,
        chrom_len: usize,
    ) -> Result<Self, EvolveError> {
        Self::new(rate, uniform_bounds(lower, upper, chrom_len)?)
    }
}

impl GeneticOperator for GaussMutation {
    fn name(&self) -> String {
        "GaussMutation".into()
    }
}

impl Mutation<RealGene> for GaussMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<RealGene>) {
        debug_assert_eq!(chromosome.len(), self.bounds.len());

        for (gene, bounds) in chromosome.iter_mut().zip(self.bounds.iter()) {
            if random::random_bool_with(self.rate.get()) {
                let sd = (bounds.upper() - bounds.lower()) / 6.0;
                let mutated = random::random_normal(*gene, sd);
                *gene = mutated.clamp(*bounds.lower(), *bounds.upper());
            }
        }
    }
}
