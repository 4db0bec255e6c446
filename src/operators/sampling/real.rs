use crate::error::EvolveError;
use crate::genetic::{BoundsVector, Chromosome, RealGene, uniform_bounds};
use crate::operators::{GeneticOperator, SamplingOperator};
use crate::random;

/// Samples each gene of a real chromosome uniformly from its bounds.
#[derive(Debug, Clone)]
pub struct RandomRealSampling {
    bounds: BoundsVector<RealGene>,
}

impl RandomRealSampling {
    pub fn new(bounds: BoundsVector<RealGene>) -> Result<Self, EvolveError> {
        if bounds.is_empty() {
            return Err(EvolveError::InvalidArgument(
                "the bounds vector must have at least one entry".into(),
            ));
        }
        Ok(Self { bounds })
    }

    /// Sampling with the same `[lower, upper]` range at every position.
    pub fn with_uniform_bounds(
        lower: f64,
        upper: f64,
        chrom_len: usize,
    ) -> Result<Self, EvolveError> {
        Self::new(uniform_bounds(lower, upper, chrom_len)?)
    }
}

impl GeneticOperator for RandomRealSampling {
    fn name(&self) -> String {
        "RandomRealSampling".into()
    }
}

impl SamplingOperator<RealGene> for RandomRealSampling {
    fn sample_chromosome(&self) -> Chromosome<RealGene> {
        self.bounds
            .iter()
            .map(|b| random::random_real_range(*b.lower(), *b.upper()))
            .collect()
    }

    fn chromosome_len(&self) -> usize {
        self.bounds.len()
    }

    fn bounds(&self) -> Option<&BoundsVector<RealGene>> {
        Some(&self.bounds)
    }
}
