//! # `genetic` – Core data structures
//!
//! The fundamental types that flow through every algorithm in *evors*: genes
//! and chromosomes, per-gene bounds, probabilities, and the [`Candidate`]
//! that couples a chromosome with its fitness vector.
//!
//! The crate is generic over the gene type through the [`Gene`] trait. Four
//! encodings are supported out of the box:
//!
//! | Alias | Type | Encoding |
//! |-------|------|----------|
//! | [`BinaryGene`] | `bool` | bit strings |
//! | [`RealGene`] | `f64` | real vectors |
//! | [`IntegerGene`] | `i64` | bounded integers |
//! | [`PermutationGene`] | `usize` | permutations of `[0, n)` |
//!
//! Real genes compare with the tolerant float predicate from [`crate::math`]
//! but hash bitwise, so two chromosomes that compare equal may still land in
//! different cache buckets. This is a documented trade-off: the fitness
//! cache may miss on near-duplicates, it can never alias distinct entries.

use std::fmt::Debug;
use std::hash::{Hash, Hasher};

use ndarray::{Array1, Array2};
use ordered_float::OrderedFloat;

use crate::error::EvolveError;
use crate::math;

/// A gene of a chromosome. Genes are plain values with equality, ordering
/// and hashability.
pub trait Gene: Clone + PartialOrd + Debug + Send + Sync + 'static {
    /// Equality between two genes. Exact for discrete encodings, tolerant
    /// for real genes.
    fn gene_eq(&self, other: &Self) -> bool;

    /// Feed the gene into a hasher. Must be consistent with exact equality;
    /// for real genes the hash is bitwise.
    fn hash_gene<H: Hasher>(&self, state: &mut H);
}

/// Gene type of the binary encoding.
pub type BinaryGene = bool;
/// Gene type of the real encoding.
pub type RealGene = f64;
/// Gene type of the integer encoding.
pub type IntegerGene = i64;
/// Gene type of the permutation encoding.
pub type PermutationGene = usize;

impl Gene for bool {
    fn gene_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_gene<H: Hasher>(&self, state: &mut H) {
        state.write_u8(*self as u8);
    }
}

impl Gene for i64 {
    fn gene_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_gene<H: Hasher>(&self, state: &mut H) {
        state.write_i64(*self);
    }
}

impl Gene for usize {
    fn gene_eq(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_gene<H: Hasher>(&self, state: &mut H) {
        state.write_usize(*self);
    }
}

impl Gene for f64 {
    fn gene_eq(&self, other: &Self) -> bool {
        math::float_is_equal(*self, *other)
    }

    fn hash_gene<H: Hasher>(&self, state: &mut H) {
        OrderedFloat(*self).hash(state);
    }
}

/// The chromosome type of the candidates: a fixed-length gene sequence.
pub type Chromosome<G> = Vec<G>;

/// Gene-wise equality of two chromosomes.
pub fn chromosomes_equal<G: Gene>(a: &[G], b: &[G]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.gene_eq(y))
}

/// The lower and upper bound of a gene position, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneBounds<G: Gene> {
    lower: G,
    upper: G,
}

impl<G: Gene> GeneBounds<G> {
    pub fn new(lower: G, upper: G) -> Result<Self, EvolveError> {
        // Exact comparison: a tolerantly-equal but inverted float pair must
        // not slip through, the samplers require lower <= upper exactly.
        let ordering = lower.partial_cmp(&upper);
        if !matches!(
            ordering,
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ) {
            return Err(EvolveError::InvalidArgument(format!(
                "the lower gene bound {lower:?} can't be greater than the upper bound {upper:?}"
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> &G {
        &self.lower
    }

    pub fn upper(&self) -> &G {
        &self.upper
    }
}

impl GeneBounds<IntegerGene> {
    /// Bounds for an integer alphabet of `base` symbols starting at
    /// `offset`, covering `[offset, offset + base - 1]`.
    pub fn with_alphabet(base: i64, offset: i64) -> Result<Self, EvolveError> {
        if base < 1 {
            return Err(EvolveError::InvalidArgument(format!(
                "the integer alphabet must have at least 1 symbol, got base {base}"
            )));
        }
        Self::new(offset, offset + base - 1)
    }
}

/// One [`GeneBounds`] per chromosome position.
pub type BoundsVector<G> = Vec<GeneBounds<G>>;

/// A bounds vector with the same `[lower, upper]` range at every position.
pub fn uniform_bounds<G: Gene>(
    lower: G,
    upper: G,
    len: usize,
) -> Result<BoundsVector<G>, EvolveError> {
    let bounds = GeneBounds::new(lower, upper)?;
    Ok(vec![bounds; len])
}

/// A probability in the closed interval `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn new(p: f64) -> Result<Self, EvolveError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(EvolveError::InvalidArgument(format!(
                "a probability must be in [0, 1], got {p}"
            )));
        }
        Ok(Self(p))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// A fitness vector; one finite entry per objective.
pub type FitnessVector = Array1<f64>;
/// A fitness matrix; one row per candidate, one column per objective.
pub type FitnessMatrix = Array2<f64>;

/// A solution candidate: a chromosome together with its fitness vector and
/// an evaluation flag. When `evaluated` is set, the fitness vector has one
/// entry per run objective.
#[derive(Debug, Clone)]
pub struct Candidate<G: Gene> {
    pub chromosome: Chromosome<G>,
    pub fitness: FitnessVector,
    pub evaluated: bool,
}

impl<G: Gene> Candidate<G> {
    /// Create an unevaluated candidate from a chromosome.
    pub fn new(chromosome: Chromosome<G>) -> Self {
        Self {
            chromosome,
            fitness: Array1::zeros(0),
            evaluated: false,
        }
    }

    /// Create an evaluated candidate with a known fitness vector.
    pub fn with_fitness(chromosome: Chromosome<G>, fitness: FitnessVector) -> Self {
        Self {
            chromosome,
            fitness,
            evaluated: true,
        }
    }
}

/// Candidate equality is defined on the chromosomes only.
impl<G: Gene> PartialEq for Candidate<G> {
    fn eq(&self, other: &Self) -> bool {
        chromosomes_equal(&self.chromosome, &other.chromosome)
    }
}

impl<G: Gene> Eq for Candidate<G> {}

/// The candidate hash depends only on the chromosome.
impl<G: Gene> Hash for Candidate<G> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.chromosome.len());
        for gene in &self.chromosome {
            gene.hash_gene(state);
        }
    }
}

/// An ordered sequence of candidates.
pub type Population<G> = Vec<Candidate<G>>;

/// Stack the fitness vectors of a population into a matrix, one row per
/// candidate.
pub fn fitness_matrix<G: Gene>(population: &[Candidate<G>]) -> FitnessMatrix {
    let num_objectives = population.first().map_or(0, |c| c.fitness.len());
    let mut data = Vec::with_capacity(population.len() * num_objectives);
    for candidate in population {
        debug_assert_eq!(candidate.fitness.len(), num_objectives);
        data.extend(candidate.fitness.iter().copied());
    }
    Array2::from_shape_vec((population.len(), num_objectives), data)
        .expect("every fitness vector has the same length")
}
