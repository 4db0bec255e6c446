//! # `operators` – Building blocks of the evolutionary loop
//!
//! Every algorithm in *evors* is assembled from a pipeline of
//! interchangeable operators. Each operator focuses on a single stage of
//! the evolutionary cycle:
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`SamplingOperator`] | generate fresh candidates for one encoding |
//! | [`Selection`] | pick parents and the survivors of each generation |
//! | [`Crossover`] | recombine two parents into two children |
//! | [`Mutation`] | perturb one candidate in place |
//!
//! The common super-trait [`GeneticOperator`] provides a small reflection
//! hook (`name()`) so the driver can identify operators in its logs.
//!
//! Operators are constructed by the user, moved into the driver once, and
//! owned by it for the rest of the run. During the parallel phases of a
//! generation the operators are only accessed through `&self`; mutable
//! state lives in the selection life-cycle hooks (`init`, `prepare`,
//! `next_population`), which the driver always calls serially.

use std::fmt::Debug;

pub mod crossover;
pub mod mutation;
pub mod sampling;
pub mod selection;

pub use crossover::Crossover;
pub use mutation::Mutation;
pub use sampling::SamplingOperator;
pub use selection::Selection;

/// Base trait of all genetic operators.
pub trait GeneticOperator: Debug {
    /// The display name of the operator, used in log output.
    fn name(&self) -> String;
}
