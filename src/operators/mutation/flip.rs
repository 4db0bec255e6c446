use crate::error::EvolveError;
use crate::genetic::{BinaryGene, Chromosome, Probability};
use crate::operators::GeneticOperator;
use crate::operators::mutation::Mutation;
use crate::random;

/// Bit-flip mutation for binary chromosomes. The number of flipped genes
/// is drawn from a binomial distribution so each position flips with
/// probability `rate` without a per-gene coin toss.
#[derive(Debug, Clone)]
pub struct FlipMutation {
    rate: Probability,
}

impl FlipMutation {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for FlipMutation {
    fn name(&self) -> String {
        "FlipMutation".into()
    }
}

impl Mutation<BinaryGene> for FlipMutation {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn mutate_chromosome(&self, chromosome: &mut Chromosome<BinaryGene>) {
        let len = chromosome.len();
        let flip_count = random::random_binomial(len as u64, self.rate.get()) as usize;

        for idx in random::sample_unique(0, len, flip_count) {
            chromosome[idx] = !chromosome[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_never_flips() {
        let op = FlipMutation::new(0.0).unwrap();
        let mut chromosome = vec![true; 50];
        op.mutate_chromosome(&mut chromosome);
        assert_eq!(chromosome, vec![true; 50]);
    }

    #[test]
    fn test_full_rate_flips_everything() {
        let op = FlipMutation::new(1.0).unwrap();
        let mut chromosome = vec![true; 50];
        op.mutate_chromosome(&mut chromosome);
        assert_eq!(chromosome, vec![false; 50]);
    }

    #[test]
    fn test_flip_count_tracks_the_rate() {
        let op = FlipMutation::new(0.1).unwrap();
        let mut flipped = 0;
        let trials = 200;
        for _ in 0..trials {
            let mut chromosome = vec![false; 100];
            op.mutate_chromosome(&mut chromosome);
            flipped += chromosome.iter().filter(|&&b| b).count();
        }
        let per_trial = flipped as f64 / trials as f64;
        assert!((5.0..15.0).contains(&per_trial), "mean flips {per_trial}");
    }
}
