use crate::genetic::{BinaryGene, Chromosome};
use crate::operators::{GeneticOperator, SamplingOperator};
use crate::random;

/// Samples each gene of a binary chromosome from a fair coin.
#[derive(Debug, Clone)]
pub struct RandomBinarySampling {
    chrom_len: usize,
}

impl RandomBinarySampling {
    pub fn new(chrom_len: usize) -> Self {
        Self { chrom_len }
    }
}

impl GeneticOperator for RandomBinarySampling {
    fn name(&self) -> String {
        "RandomBinarySampling".into()
    }
}

impl SamplingOperator<BinaryGene> for RandomBinarySampling {
    fn sample_chromosome(&self) -> Chromosome<BinaryGene> {
        (0..self.chrom_len).map(|_| random::random_bool()).collect()
    }

    fn chromosome_len(&self) -> usize {
        self.chrom_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_chromosome_has_requested_length() {
        let sampler = RandomBinarySampling::new(64);
        let chromosome = sampler.sample_chromosome();
        assert_eq!(chromosome.len(), 64);
    }

    #[test]
    fn test_both_gene_values_occur() {
        let sampler = RandomBinarySampling::new(256);
        let chromosome = sampler.sample_chromosome();
        assert!(chromosome.iter().any(|&b| b));
        assert!(chromosome.iter().any(|&b| !b));
    }
}
