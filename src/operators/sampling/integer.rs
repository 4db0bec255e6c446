use crate::error::EvolveError;
use crate::genetic::{BoundsVector, Chromosome, GeneBounds, IntegerGene};
use crate::operators::{GeneticOperator, SamplingOperator};
use crate::random;

/// Samples each gene of an integer chromosome uniformly from its
/// `[lower, upper]` bounds.
#[derive(Debug, Clone)]
pub struct RandomIntegerSampling {
    bounds: BoundsVector<IntegerGene>,
}

impl RandomIntegerSampling {
    pub fn new(bounds: BoundsVector<IntegerGene>) -> Result<Self, EvolveError> {
        if bounds.is_empty() {
            return Err(EvolveError::InvalidArgument(
                "the bounds vector must have at least one entry".into(),
            ));
        }
        Ok(Self { bounds })
    }

    /// Sampling from an alphabet of `base` symbols starting at `offset`,
    /// the same at every position.
    pub fn with_alphabet(base: i64, offset: i64, chrom_len: usize) -> Result<Self, EvolveError> {
        let bounds = GeneBounds::with_alphabet(base, offset)?;
        Self::new(vec![bounds; chrom_len])
    }
}

impl GeneticOperator for RandomIntegerSampling {
    fn name(&self) -> String {
        "RandomIntegerSampling".into()
    }
}

impl SamplingOperator<IntegerGene> for RandomIntegerSampling {
    fn sample_chromosome(&self) -> Chromosome<IntegerGene> {
        self.bounds
            .iter()
            .map(|b| random::random_int(*b.lower(), *b.upper()))
            .collect()
    }

    fn chromosome_len(&self) -> usize {
        self.bounds.len()
    }

    fn bounds(&self) -> Option<&BoundsVector<IntegerGene>> {
        Some(&self.bounds)
    }
}
