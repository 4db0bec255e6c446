use crate::error::EvolveError;
use crate::genetic::{Chromosome, PermutationGene, Probability};
use crate::operators::GeneticOperator;
use crate::operators::crossover::Crossover;
use crate::random;

/// Order crossover (OX1) for permutation chromosomes: each child keeps the
/// segment between two random cut points from one parent and fills the
/// remaining positions with the other parent's genes in their original
/// order, starting after the second cut point.
#[derive(Debug, Clone)]
pub struct OrderCrossover {
    rate: Probability,
}

impl OrderCrossover {
    pub fn new(rate: f64) -> Result<Self, EvolveError> {
        Ok(Self {
            rate: Probability::new(rate)?,
        })
    }
}

impl GeneticOperator for OrderCrossover {
    fn name(&self) -> String {
        "OrderCrossover".into()
    }
}

fn ox1(keep: &[PermutationGene], fill: &[PermutationGene], first: usize, last: usize) -> Chromosome<PermutationGene> {
    let len = keep.len();
    let mut child = vec![0; len];
    let mut used = vec![false; len];

    for i in first..last {
        child[i] = keep[i];
        used[keep[i]] = true;
    }

    let mut fill_pos = last % len;
    for offset in 0..len {
        let gene = fill[(last + offset) % len];
        if !used[gene] {
            child[fill_pos] = gene;
            used[gene] = true;
            fill_pos = (fill_pos + 1) % len;
        }
    }

    child
}

impl Crossover<PermutationGene> for OrderCrossover {
    fn rate(&self) -> Probability {
        self.rate
    }

    fn cross(
        &self,
        parent_a: &[PermutationGene],
        parent_b: &[PermutationGene],
    ) -> (Chromosome<PermutationGene>, Chromosome<PermutationGene>) {
        let len = parent_a.len();
        if len < 2 {
            return (parent_a.to_vec(), parent_b.to_vec());
        }

        let mut cuts = random::sample_unique(0, len + 1, 2);
        cuts.sort_unstable();
        let (first, last) = (cuts[0], cuts[1]);

        (
            ox1(parent_a, parent_b, first, last),
            ox1(parent_b, parent_a, first, last),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(chromosome: &[usize]) -> bool {
        let mut seen = vec![false; chromosome.len()];
        for &gene in chromosome {
            if gene >= chromosome.len() || seen[gene] {
                return false;
            }
            seen[gene] = true;
        }
        true
    }

    #[test]
    fn test_children_are_permutations() {
        let op = OrderCrossover::new(1.0).unwrap();
        let a: Vec<usize> = (0..20).collect();
        let mut b = a.clone();
        b.reverse();

        for _ in 0..50 {
            let (child_a, child_b) = op.cross(&a, &b);
            assert!(is_permutation(&child_a));
            assert!(is_permutation(&child_b));
        }
    }

    #[test]
    fn test_kept_segment_comes_from_the_first_parent() {
        let a: Vec<usize> = (0..8).collect();
        let b: Vec<usize> = (0..8).rev().collect();

        // With fixed cut points the expected children are known.
        let child_a = ox1(&a, &b, 2, 5);
        let child_b = ox1(&b, &a, 2, 5);
        assert_eq!(child_a, vec![6, 5, 2, 3, 4, 1, 0, 7]);
        assert_eq!(child_b, vec![1, 2, 5, 4, 3, 6, 7, 0]);
    }
}
