use crate::error::EvolveError;
use crate::genetic::{
    BoundsVector, Chromosome, IntegerGene, Probability, RealGene, uniform_bounds,
};
use crate::operators::GeneticOperator;
use crate::operators::mutation::Mutation;
use crate::random;

/// Uniform mutation for real chromosomes: each gene is resampled uniformly
/// from its bounds with probability `rate`.
#[derive(Debug, Clone)]
pub struct UniformRealMutation {
    rate: Probability,
    bounds: BoundsVector<RealGene>,
}

impl UniformRealMutation {
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

impl GeneticOperator for UniformRealMutation {
    fn name(&self) -> String {
        "UniformRealMutation".into()
    }
}

impl Mutation<RealGene> for UniformRealMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<RealGene>) {
        debug_assert_eq!(chromosome.len(), self.bounds.len());

        for (gene, bounds) in chromosome.iter_mut().zip(self.bounds.iter()) {
            if random::random_bool_with(self.rate.get()) {
                *gene = random::random_real_range(*bounds.lower(), *bounds.upper());
            }
        }
    }
}

/// Uniform mutation for integer chromosomes: each gene is resampled
/// uniformly from its `[lower, upper]` bounds with probability `rate`.
#[derive(Debug, Clone)]
pub struct UniformIntegerMutation {
    rate: Probability,
    bounds: BoundsVector<IntegerGene>,
}

impl UniformIntegerMutation {
    pub fn new(rate: f64, bounds: BoundsVector<IntegerGene>) -> Result<Self, EvolveError> {
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

    /// Mutation over an alphabet of `base` symbols starting at `offset`.
    pub fn with_alphabet(
        rate: f64,
        base: i64,
        offset: i64,
        chrom_len: usize,
    ) -> Result<Self, EvolveError> {
        let bounds = crate::genetic::GeneBounds::with_alphabet(base, offset)?;
        Self::new(rate, vec![bounds; chrom_len])
    }
}

impl GeneticOperator for UniformIntegerMutation {
    fn name(&self) -> String {
        "UniformIntegerMutation".into()
    }
}

impl Mutation<IntegerGene> for UniformIntegerMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<IntegerGene>) {
        debug_assert_eq!(chromosome.len(), self.bounds.len());

        for (gene, bounds) in chromosome.iter_mut().zip(self.bounds.iter()) {
            if random::random_bool_with(self.rate.get()) {
                *gene = random::random_int(*bounds.lower(), *bounds.upper());
            }
        }
    }
}
