//! # `math` – Numeric kernel
//!
//! Tolerant float comparison, Pareto relations and the small set of vector
//! geometry helpers used by the selection algorithms. Every dominance check
//! in the crate routes through [`float_is_equal`] / [`float_is_less`] so
//! float noise can't introduce comparison cycles.
//!
//! The comparison tolerances are process-wide and configurable through
//! [`set_abs_tolerance`] / [`set_rel_tolerance`]; the effective tolerance for
//! a pair `(a, b)` is `max(abs_tol, rel_tol * max(|a|, |b|))`.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array1, ArrayView1};

const DEFAULT_ABS_TOLERANCE: f64 = 10.0 * f64::EPSILON;
const DEFAULT_REL_TOLERANCE: f64 = 10.0 * f64::EPSILON;

static ABS_TOLERANCE: AtomicU64 = AtomicU64::new(DEFAULT_ABS_TOLERANCE.to_bits());
static REL_TOLERANCE: AtomicU64 = AtomicU64::new(DEFAULT_REL_TOLERANCE.to_bits());

/// The current absolute comparison tolerance.
pub fn abs_tolerance() -> f64 {
    f64::from_bits(ABS_TOLERANCE.load(Ordering::Relaxed))
}

/// The current relative comparison tolerance.
pub fn rel_tolerance() -> f64 {
    f64::from_bits(REL_TOLERANCE.load(Ordering::Relaxed))
}

/// Set the absolute comparison tolerance, returning the previous value.
/// Must not be negative.
pub fn set_abs_tolerance(tolerance: f64) -> f64 {
    assert!(tolerance >= 0.0, "the absolute tolerance must not be negative");
    f64::from_bits(ABS_TOLERANCE.swap(tolerance.to_bits(), Ordering::Relaxed))
}

/// Set the relative comparison tolerance, returning the previous value.
/// Must not be negative.
pub fn set_rel_tolerance(tolerance: f64) -> f64 {
    assert!(tolerance >= 0.0, "the relative tolerance must not be negative");
    f64::from_bits(REL_TOLERANCE.swap(tolerance.to_bits(), Ordering::Relaxed))
}

fn tolerance_for(a: f64, b: f64) -> f64 {
    f64::max(abs_tolerance(), rel_tolerance() * f64::max(a.abs(), b.abs()))
}

/// Tolerant float equality. NaN is never equal to anything, infinities of
/// the same sign compare equal.
pub fn float_is_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= tolerance_for(a, b)
}

/// Tolerant `a < b`.
pub fn float_is_less(a: f64, b: f64) -> bool {
    b - a > tolerance_for(a, b)
}

/// Tolerant `a <= b`.
pub fn float_is_less_eq(a: f64, b: f64) -> bool {
    !float_is_less(b, a)
}

/// Returns whether `a` Pareto-dominates `b` (maximization convention):
/// `a` is at least as good in every coordinate and strictly better in at
/// least one.
pub fn pareto_dominates(a: ArrayView1<f64>, b: ArrayView1<f64>) -> bool {
    pareto_compare(a, b) > 0
}

/// Three-way Pareto comparison of two fitness vectors of equal length.
///
/// Returns `1` if `a` dominates `b`, `-1` if `b` dominates `a`, and `0`
/// when the vectors are incomparable or equal.
pub fn pareto_compare(a: ArrayView1<f64>, b: ArrayView1<f64>) -> i8 {
    debug_assert_eq!(a.len(), b.len());

    let mut a_better = false;
    let mut b_better = false;
    for (&x, &y) in a.iter().zip(b.iter()) {
        if float_is_less(y, x) {
            a_better = true;
        } else if float_is_less(x, y) {
            b_better = true;
        }
    }

    match (a_better, b_better) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

/// The squared Euclidean distance between two vectors.
pub fn euclidean_distance_sq(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum()
}

/// The Euclidean norm of a vector.
pub fn euclidean_norm(v: ArrayView1<f64>) -> f64 {
    v.dot(&v).sqrt()
}

/// The squared perpendicular distance between the line through the origin
/// with direction `line` and `point`.
pub fn perpendicular_distance_sq(line: ArrayView1<f64>, point: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(line.len(), point.len());

    let line_norm_sq = line.dot(&line);
    if line_norm_sq == 0.0 {
        return point.dot(&point);
    }

    let projection = point.dot(&line) / line_norm_sq;
    line.iter()
        .zip(point.iter())
        .map(|(&l, &p)| {
            let d = p - projection * l;
            d * d
        })
        .sum()
}

/// Scale a vector to unit Euclidean length. The zero vector is returned
/// unchanged.
pub fn normalize_vector(v: ArrayView1<f64>) -> Array1<f64> {
    let norm = euclidean_norm(v);
    if norm == 0.0 {
        return v.to_owned();
    }
    v.mapv(|x| x / norm)
}
