//! # evors – evolutionary optimization in Rust
//!
//! *evors* searches for maxima of a user-supplied fitness function over a
//! chromosome space. The same generational loop drives single-objective
//! and multi-/many-objective optimization; what changes is the plugged-in
//! [`Selection`] strategy.
//!
//! ## Building blocks
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`genetic`] | genes, chromosomes, bounds, [`Candidate`], populations |
//! | [`operators`] | sampling, selection (incl. NSGA-II / NSGA-III), crossover, mutation |
//! | [`stopping`] | early stop conditions and their combinators |
//! | [`algorithms`] | the [`GeneticAlgorithm`] driver and its builder |
//! | [`random`] | the thread-local RNG service used by every stochastic operator |
//! | [`math`] | tolerant float comparison, Pareto relations, distances |
//! | [`cone_tree`] | maximum inner-product search for NSGA-III association |
//! | [`cache`] | the FIFO fitness cache |
//!
//! Four chromosome encodings are supported out of the box: binary, real,
//! bounded integer and permutation. The crate is generic over the
//! [`Gene`] type, so further encodings only need a `Gene` impl and a
//! sampling operator.
//!
//! ## Example: single-objective real encoding
//!
//! ```rust,no_run
//! use ndarray::array;
//! use evors::algorithms::GeneticAlgorithmBuilder;
//! use evors::operators::crossover::ArithmeticCrossover;
//! use evors::operators::mutation::GaussMutation;
//! use evors::operators::sampling::RandomRealSampling;
//! use evors::operators::selection::Boltzmann;
//!
//! # fn main() -> Result<(), evors::EvolveError> {
//! let mut ga = GeneticAlgorithmBuilder::default()
//!     .sampler(RandomRealSampling::with_uniform_bounds(0.0, 3.14, 1)?)
//!     .selection(Boltzmann::new())
//!     .crossover(ArithmeticCrossover::new(0.8)?)
//!     .mutation(GaussMutation::with_uniform_bounds(0.1, 0.0, 3.14, 1)?)
//!     .fitness_fn(|x: &[f64]| array![x[0].sin()])
//!     .seed(0x3da99432ab975d26)
//!     .build()?;
//!
//! let best = ga.solve()?;
//! println!("best: {:?}", best[0]);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod cache;
pub mod cone_tree;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod genetic;
pub mod math;
pub mod operators;
pub mod random;
pub mod stopping;

pub use algorithms::{GeneticAlgorithm, GeneticAlgorithmBuilder, GenerationCallback, RepairFn};
pub use cache::FifoCache;
pub use cone_tree::ConeTree;
pub use context::{FitnessStats, RunInfo};
pub use error::EvolveError;
pub use evaluator::{Evaluator, FitnessFn};
pub use genetic::{
    BinaryGene, BoundsVector, Candidate, Chromosome, FitnessMatrix, FitnessVector, Gene,
    GeneBounds, IntegerGene, PermutationGene, Population, Probability, RealGene,
};
pub use operators::selection::{
    Boltzmann, Nsga2, Nsga3, Rank, Replacement, Roulette, Sigma, Tournament,
};
pub use operators::{Crossover, GeneticOperator, Mutation, SamplingOperator, Selection};
pub use stopping::StopCondition;
