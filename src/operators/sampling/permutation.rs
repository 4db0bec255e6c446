use crate::genetic::{Chromosome, PermutationGene};
use crate::operators::{GeneticOperator, SamplingOperator};
use crate::random;

/// Samples a random permutation of `[0, n)` by filling the identity and
/// shuffling it.
#[derive(Debug, Clone)]
pub struct RandomPermutationSampling {
    chrom_len: usize,
}

impl RandomPermutationSampling {
    pub fn new(chrom_len: usize) -> Self {
        Self { chrom_len }
    }
}

impl GeneticOperator for RandomPermutationSampling {
    fn name(&self) -> String {
        "RandomPermutationSampling".into()
    }
}

impl SamplingOperator<PermutationGene> for RandomPermutationSampling {
    fn sample_chromosome(&self) -> Chromosome<PermutationGene> {
        let mut chromosome: Vec<PermutationGene> = (0..self.chrom_len).collect();
        random::shuffle(&mut chromosome);
        chromosome
    }

    fn chromosome_len(&self) -> usize {
        self.chrom_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampled_chromosome_is_a_permutation() {
        let sampler = RandomPermutationSampling::new(30);
        for _ in 0..10 {
            let mut chromosome = sampler.sample_chromosome();
            chromosome.sort_unstable();
            assert_eq!(chromosome, (0..30).collect::<Vec<_>>());
        }
    }
}
