//! # `stopping` – Early stop conditions
//!
//! A [`StopCondition`] is polled by the driver once at the end of every
//! generation; the driver always stops when `max_generations` is reached,
//! whether or not an early stop condition is set.
//!
//! | Condition | Stops when |
//! |-----------|------------|
//! | [`MaxFitnessEvals`] | the evaluation budget is spent |
//! | [`FitnessThreshold`] | some candidate matches or dominates a target vector |
//! | [`FitnessMeanStall`] | the population mean stalls for `patience` generations |
//! | [`FitnessBestStall`] | the population best stalls for `patience` generations |
//! | [`AnyOf`] / [`AllOf`] | a combination of other conditions fires |
//!
//! The combinators evaluate all of their members unconditionally, without
//! short-circuiting, because conditions may rely on side effects of
//! `evaluate` to maintain their internal counters.

use ndarray::Array1;

use crate::context::RunInfo;
use crate::error::EvolveError;
use crate::genetic::FitnessVector;
use crate::math;

/// An early stop condition for the evolutionary driver.
pub trait StopCondition: Send {
    /// Returns true if the run should stop. Called once per generation.
    fn evaluate(&mut self, info: &RunInfo) -> bool;
}

/// Stop after a set number of fitness function evaluations.
///
/// The condition is only polled at the end of each generation, so the
/// actual number of evaluations may be somewhat higher than the limit.
#[derive(Debug, Clone)]
pub struct MaxFitnessEvals {
    max_evals: u64,
}

impl MaxFitnessEvals {
    pub fn new(max_evals: u64) -> Self {
        Self { max_evals }
    }
}

impl StopCondition for MaxFitnessEvals {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        info.num_fitness_evals >= self.max_evals
    }
}

/// Stop once any candidate's fitness vector is equal to or dominates a
/// threshold vector (maximization convention).
#[derive(Debug, Clone)]
pub struct FitnessThreshold {
    threshold: FitnessVector,
}

impl FitnessThreshold {
    pub fn new(threshold: FitnessVector) -> Self {
        Self { threshold }
    }
}

impl StopCondition for FitnessThreshold {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        info.fitness_matrix.rows().into_iter().any(|row| {
            let equal = row
                .iter()
                .zip(self.threshold.iter())
                .all(|(&a, &b)| math::float_is_equal(a, b));
            equal || math::pareto_dominates(row, self.threshold.view())
        })
    }
}

/// Shared stall bookkeeping: stop after `patience` generations without any
/// coordinate improving by at least `delta`.
#[derive(Debug, Clone)]
struct StallTracker {
    patience: usize,
    delta: f64,
    cntr: usize,
    best: Option<Array1<f64>>,
}

impl StallTracker {
    fn new(patience: usize, delta: f64) -> Self {
        Self {
            patience,
            delta,
            cntr: 0,
            best: None,
        }
    }

    fn update(&mut self, current: &Array1<f64>) -> bool {
        match &mut self.best {
            None => {
                self.best = Some(current.clone());
                self.cntr = 0;
                false
            }
            Some(best) => {
                let improved = current
                    .iter()
                    .zip(best.iter())
                    .any(|(&c, &b)| c - b >= self.delta);
                if improved {
                    for (b, &c) in best.iter_mut().zip(current.iter()) {
                        *b = b.max(c);
                    }
                    self.cntr = 0;
                    false
                } else {
                    self.cntr += 1;
                    self.cntr > self.patience
                }
            }
        }
    }
}

/// Stop when the mean fitness vector of the population hasn't improved for
/// `patience` generations. The mean vector counts as improved when any
/// coordinate grows by at least `delta`.
#[derive(Debug, Clone)]
pub struct FitnessMeanStall {
    tracker: StallTracker,
}

impl FitnessMeanStall {
    pub fn new(patience: usize) -> Self {
        Self::with_delta(patience, 1e-6)
    }

    pub fn with_delta(patience: usize, delta: f64) -> Self {
        Self {
            tracker: StallTracker::new(patience, delta),
        }
    }
}

impl StopCondition for FitnessMeanStall {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        self.tracker.update(&info.stats.mean)
    }
}

/// Stop when the best fitness values of the population haven't improved for
/// `patience` generations. The best vector counts as improved when any
/// coordinate grows by at least `delta`.
#[derive(Debug, Clone)]
pub struct FitnessBestStall {
    tracker: StallTracker,
}

impl FitnessBestStall {
    pub fn new(patience: usize) -> Self {
        Self::with_delta(patience, 1e-6)
    }

    pub fn with_delta(patience: usize, delta: f64) -> Self {
        Self {
            tracker: StallTracker::new(patience, delta),
        }
    }
}

impl StopCondition for FitnessBestStall {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        self.tracker.update(&info.stats.max)
    }
}

/// Composite stop condition which fires when any member fires.
pub struct AnyOf {
    parts: Vec<Box<dyn StopCondition>>,
}

impl AnyOf {
    pub fn new(parts: Vec<Box<dyn StopCondition>>) -> Result<Self, EvolveError> {
        if parts.is_empty() {
            return Err(EvolveError::InvalidArgument(
                "a composite stop condition needs at least one member".into(),
            ));
        }
        Ok(Self { parts })
    }
}

impl StopCondition for AnyOf {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        // Evaluate every member; they may rely on per-generation side
        // effects, so no short-circuiting.
        let mut stop = false;
        for part in &mut self.parts {
            stop |= part.evaluate(info);
        }
        stop
    }
}

/// Composite stop condition which fires when all members fire.
pub struct AllOf {
    parts: Vec<Box<dyn StopCondition>>,
}

impl AllOf {
    pub fn new(parts: Vec<Box<dyn StopCondition>>) -> Result<Self, EvolveError> {
        if parts.is_empty() {
            return Err(EvolveError::InvalidArgument(
                "a composite stop condition needs at least one member".into(),
            ));
        }
        Ok(Self { parts })
    }
}

impl StopCondition for AllOf {
    fn evaluate(&mut self, info: &RunInfo) -> bool {
        // Evaluate every member; they may rely on per-generation side
        // effects, so no short-circuiting.
        let mut stop = true;
        for part in &mut self.parts {
            stop &= part.evaluate(info);
        }
        stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FitnessStats;
    use crate::genetic::FitnessMatrix;
    use ndarray::array;

    fn info_for<'a>(fmat: &'a FitnessMatrix, stats: &'a FitnessStats, evals: u64) -> RunInfo<'a> {
        RunInfo {
            generation: 0,
            max_generations: 100,
            population_size: fmat.nrows(),
            num_objectives: fmat.ncols(),
            num_fitness_evals: evals,
            fitness_matrix: fmat,
            stats,
        }
    }

    #[test]
    fn test_max_fitness_evals() {
        let fmat = array![[1.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        let mut stop = MaxFitnessEvals::new(100);

        assert!(!stop.evaluate(&info_for(&fmat, &stats, 99)));
        assert!(stop.evaluate(&info_for(&fmat, &stats, 100)));
    }

    #[test]
    fn test_fitness_threshold_by_dominance() {
        let mut stop = FitnessThreshold::new(array![1.0, 1.0]);

        let below = array![[0.5, 2.0]];
        let stats = FitnessStats::from_matrix(&below);
        assert!(!stop.evaluate(&info_for(&below, &stats, 0)));

        let above = array![[0.5, 2.0], [1.5, 1.0]];
        let stats = FitnessStats::from_matrix(&above);
        assert!(stop.evaluate(&info_for(&above, &stats, 0)));

        let equal = array![[1.0, 1.0]];
        let stats = FitnessStats::from_matrix(&equal);
        assert!(stop.evaluate(&info_for(&equal, &stats, 0)));
    }

    #[test]
    fn test_mean_stall_counts_stalled_generations() {
        let mut stop = FitnessMeanStall::with_delta(2, 1e-6);

        let improving = [1.0, 2.0, 3.0];
        for &f in &improving {
            let fmat = array![[f]];
            let stats = FitnessStats::from_matrix(&fmat);
            assert!(!stop.evaluate(&info_for(&fmat, &stats, 0)));
        }

        // Three stalled generations exceed a patience of 2.
        let fmat = array![[3.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        assert!(!stop.evaluate(&info_for(&fmat, &stats, 0)));
        assert!(!stop.evaluate(&info_for(&fmat, &stats, 0)));
        assert!(stop.evaluate(&info_for(&fmat, &stats, 0)));
    }

    #[test]
    fn test_best_stall_resets_on_improvement() {
        let mut stop = FitnessBestStall::with_delta(1, 0.5);

        let fmat = array![[1.0], [2.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        assert!(!stop.evaluate(&info_for(&fmat, &stats, 0)));
        assert!(!stop.evaluate(&info_for(&fmat, &stats, 0)));

        // Improvement by at least delta resets the counter.
        let better = array![[1.0], [2.6]];
        let stats = FitnessStats::from_matrix(&better);
        assert!(!stop.evaluate(&info_for(&better, &stats, 0)));
        assert!(!stop.evaluate(&info_for(&better, &stats, 0)));
        assert!(stop.evaluate(&info_for(&better, &stats, 0)));
    }

    /// Stop condition that counts how many times it was evaluated.
    struct Counting {
        calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
        result: bool,
    }

    impl StopCondition for Counting {
        fn evaluate(&mut self, _info: &RunInfo) -> bool {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            self.result
        }
    }

    #[test]
    fn test_combinators_evaluate_all_members() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let fmat = array![[1.0]];
        let stats = FitnessStats::from_matrix(&fmat);
        let calls = Arc::new(AtomicUsize::new(0));

        let mut any = AnyOf::new(vec![
            Box::new(Counting { calls: calls.clone(), result: true }),
            Box::new(Counting { calls: calls.clone(), result: false }),
            Box::new(Counting { calls: calls.clone(), result: true }),
        ])
        .unwrap();

        assert!(any.evaluate(&info_for(&fmat, &stats, 0)));
        // All three members ran even though the first already fired.
        assert_eq!(calls.load(Ordering::Relaxed), 3);

        calls.store(0, Ordering::Relaxed);
        let mut all = AllOf::new(vec![
            Box::new(Counting { calls: calls.clone(), result: false }),
            Box::new(Counting { calls: calls.clone(), result: true }),
        ])
        .unwrap();

        assert!(!all.evaluate(&info_for(&fmat, &stats, 0)));
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_empty_combinator_is_rejected() {
        assert!(AnyOf::new(Vec::new()).is_err());
        assert!(AllOf::new(Vec::new()).is_err());
    }
}
