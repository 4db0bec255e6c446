use crate::error::EvolveError;
use crate::genetic::{Chromosome, Probability, RealGene};
use crate::operators::GeneticOperator;
use crate::operators::crossover::Crossover;
use crate::random;

/// Arithmetic crossover for real chromosomes: every child gene is a convex
/// combination of the parent genes with a fresh random weight per position,
/// so the children always stay inside the box spanned by the parents.
#[derive(Debug, Clone)]
pub struct ArithmeticCrossover {
    rate: Probability,
}

impl ArithmeticCrossover {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for ArithmeticCrossover {
    fn name(&self) -> String {
        "ArithmeticCrossover".into()
    }
}

impl Crossover<RealGene> for ArithmeticCrossover {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn cross(&self, parent_a: &[f64], parent_b: &[f64]) -> (Chromosome<f64>, Chromosome<f64>) {
        let mut child_a = Vec::with_capacity(parent_a.len());
        let mut child_b = Vec::with_capacity(parent_b.len());

        for (&a, &b) in parent_a.iter().zip(parent_b.iter()) {
            let alpha = random::random_real();
            child_a.push(alpha * a + (1.0 - alpha) * b);
            child_b.push((1.0 - alpha) * a + alpha * b);
        }

        (child_a, child_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_children_stay_in_the_parent_box() {
        let op = ArithmeticCrossover::new(1.0).unwrap();
        let a = vec![0.0, -1.0, 5.0];
        let b = vec![1.0, 1.0, 5.0];

        for _ in 0..20 {
            let (child_a, child_b) = op.cross(&a, &b);
            for (i, (&x, &y)) in child_a.iter().zip(child_b.iter()).enumerate() {
                let lo = a[i].min(b[i]);
                let hi = a[i].max(b[i]);
                assert!((lo..=hi).contains(&x));
                assert!((lo..=hi).contains(&y));
                // The gene sum is preserved by the convex mix.
                assert_abs_diff_eq!(x + y, a[i] + b[i], epsilon = 1e-12);
            }
        }
    }
}
