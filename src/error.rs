//! Unified error type for the crate.
//!
//! Every fallible operation, from operator construction to a full
//! [`solve`](crate::algorithms::GeneticAlgorithm::solve) call, reports one of
//! the variants below. Errors are always fatal for the run that produced
//! them; nothing is caught or retried internally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvolveError {
    /// A parameter is outside its valid domain (rate outside `[0, 1]`,
    /// empty cdf, inverted bounds, zero sizes, bad integer alphabet).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two collaborating values disagree on their dimensions (fitness vector
    /// of the wrong length, preset chromosome of the wrong length, bounds
    /// vector of the wrong length).
    #[error("dimension mismatch: expected {expected}, got {found} ({what})")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// The fitness function produced a NaN or infinite value.
    #[error("numeric error: {0}")]
    NumericError(String),

    /// An operator broke one of its contracts (a mutation or repair changed
    /// the chromosome length).
    #[error("contract violation: {0}")]
    ContractViolation(String),
}
