//! # `sampling` – Per-encoding candidate initialization
//!
//! A [`SamplingOperator`] knows how to generate a fresh random chromosome
//! for one encoding, and carries the per-gene bounds where the encoding has
//! them (real and integer; binary and permutation chromosomes are
//! unbounded).

mod binary;
mod integer;
mod permutation;
mod real;

pub use binary::RandomBinarySampling;
pub use integer::RandomIntegerSampling;
pub use permutation::RandomPermutationSampling;
pub use real::RandomRealSampling;

use crate::genetic::{BoundsVector, Chromosome, Gene};
use crate::operators::GeneticOperator;

/// Generates fresh candidates for one encoding.
pub trait SamplingOperator<G: Gene>: GeneticOperator + Send + Sync {
    /// Generate one random chromosome.
    fn sample_chromosome(&self) -> Chromosome<G>;

    /// The chromosome length of the encoding.
    fn chromosome_len(&self) -> usize;

    /// The per-gene bounds of the encoding, if it has any.
    fn bounds(&self) -> Option<&BoundsVector<G>> {
        None
    }
}
