//! # `random` – Concurrent RNG service
//!
//! All stochastic operators in *evors* draw their randomness from this
//! module instead of juggling the `rand` crate's API at every call site.
//! The service is a process-wide facade over a **thread-local** [`Splitmix64`]
//! generator: each thread owns its own state, seeded deterministically from
//! the global seed plus a per-process thread ordinal, so a fixed seed yields
//! reproducible runs for a fixed thread count and no locking is ever needed.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`random_bool`] | fair coin from the top bit of one 64-bit draw |
//! | [`random_bool_with`] | Bernoulli(`p`) |
//! | [`random_int`] | integer in the closed range `[lo, hi]` |
//! | [`random_real`], [`random_real_range`] | float in `[0, 1]` / `[lo, hi]` |
//! | [`random_normal`] | normal draw, `sd == 0` returns the mean |
//! | [`random_binomial`] | exact or truncated-normal binomial draw |
//! | [`random_index`], [`random_element`] | uniform container access |
//! | [`sample_unique`] | `count` distinct integers from `[lo, hi)` |
//! | [`sample_cdf`] | index sampled from a discrete cdf |
//! | [`random_simplex_point`] | uniform point on the unit simplex |
//! | [`shuffle`] | in-place Fisher-Yates |
//!
//! [`Splitmix64`] implements [`RngCore`] and [`SeedableRng`], so any `rand`
//! distribution can also run on top of it directly (see [`with_prng`]).

use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array1;
use num_traits::PrimInt;
use rand::distr::uniform::SampleUniform;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::{Binomial, Distribution, Normal};

/// The default global seed of the service.
pub const DEFAULT_SEED: u64 = 0x3da9_9432_ab97_5d26;

/// Splitmix64 pseudo-random number generator, based on
/// <https://prng.di.unimi.it/splitmix64.c>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitmix64 {
    state: u64,
}

impl Splitmix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl RngCore for Splitmix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for Splitmix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

static GLOBAL_SEED: AtomicU64 = AtomicU64::new(DEFAULT_SEED);
static NEXT_THREAD_ORDINAL: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_PRNG: RefCell<Splitmix64> = RefCell::new(Splitmix64::new(
        GLOBAL_SEED
            .load(Ordering::Relaxed)
            .wrapping_add(NEXT_THREAD_ORDINAL.fetch_add(1, Ordering::Relaxed)),
    ));
}

/// Set the global seed of the RNG service.
///
/// The calling thread is reseeded immediately with ordinal 0; threads
/// spawned afterwards derive their state from the new seed and the next
/// ordinals. Already-running sibling threads keep their current stream.
pub fn set_global_seed(seed: u64) {
    GLOBAL_SEED.store(seed, Ordering::Relaxed);
    NEXT_THREAD_ORDINAL.store(1, Ordering::Relaxed);
    THREAD_PRNG.with(|prng| *prng.borrow_mut() = Splitmix64::new(seed));
}

/// Run `f` with mutable access to the calling thread's generator.
pub fn with_prng<R>(f: impl FnOnce(&mut Splitmix64) -> R) -> R {
    THREAD_PRNG.with(|prng| f(&mut prng.borrow_mut()))
}

/// Generate a random boolean from a uniform distribution.
pub fn random_bool() -> bool {
    with_prng(|rng| rng.next_u64() >> 63 != 0)
}

/// Generate a random boolean which is `true` with probability `p`.
pub fn random_bool_with(p: f64) -> bool {
    assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");
    with_prng(|rng| rng.random_bool(p))
}

/// Generate a random integer from a uniform distribution on the closed
/// interval `[lbound, ubound]`.
pub fn random_int<T>(lbound: T, ubound: T) -> T
where
    T: SampleUniform + PartialOrd + Copy,
{
    assert!(
        lbound <= ubound,
        "the lower bound must not be greater than the upper bound"
    );
    with_prng(|rng| rng.random_range(lbound..=ubound))
}

/// Generate a random float from a uniform distribution on `[0, 1]`.
pub fn random_real() -> f64 {
    random_real_range(0.0, 1.0)
}

/// Generate a random float from a uniform distribution on the closed
/// interval `[lbound, ubound]`.
pub fn random_real_range(lbound: f64, ubound: f64) -> f64 {
    assert!(
        lbound <= ubound,
        "the lower bound must not be greater than the upper bound"
    );
    with_prng(|rng| rng.random_range(lbound..=ubound))
}

/// Generate a random float from a normal distribution with the given mean
/// and standard deviation. A zero standard deviation returns the mean.
pub fn random_normal(mean: f64, sd: f64) -> f64 {
    assert!(sd >= 0.0, "the standard deviation must not be negative");
    if sd == 0.0 {
        return mean;
    }
    let dist = Normal::new(mean, sd).expect("valid normal distribution parameters");
    with_prng(|rng| dist.sample(rng))
}

/// Generate a random integer from an approximate binomial distribution.
///
/// Uses the exact sampler when the mean `n * p` is small, and a normal
/// approximation truncated to `(-0.5, n + 0.5)` otherwise.
pub fn random_binomial(n: u64, p: f64) -> u64 {
    assert!((0.0..=1.0).contains(&p), "p must be in [0, 1]");

    let mean = n as f64 * p;
    if mean < 2.0 {
        let dist = Binomial::new(n, p).expect("valid binomial distribution parameters");
        return with_prng(|rng| dist.sample(rng));
    }

    let sd = (mean * (1.0 - p)).sqrt();
    let accept_min = -0.5;
    let accept_max = n as f64 + 0.5;

    let mut draw = random_normal(mean, sd);
    while !(accept_min < draw && draw < accept_max) {
        draw = random_normal(mean, sd);
    }
    draw.round() as u64
}

/// Generate a random index for a container of length `len`.
pub fn random_index(len: usize) -> usize {
    assert!(len > 0, "the container must not be empty");
    random_int(0, len - 1)
}

/// Pick a random element of a slice.
pub fn random_element<T>(slice: &[T]) -> &T {
    assert!(!slice.is_empty(), "the slice must not be empty");
    with_prng(|rng| slice.choose(rng)).expect("the slice is not empty")
}

/// Shuffle a slice in place.
pub fn shuffle<T>(slice: &mut [T]) {
    with_prng(|rng| slice.shuffle(rng));
}

/// Ranges at least this long are sampled through a hash set instead of a
/// dense marker vector.
const HUGE_RANGE: usize = 1 << 20;

/// Generate `count` unique integers from the half-open range
/// `[lbound, ubound)`.
pub fn sample_unique<T>(lbound: T, ubound: T, count: usize) -> Vec<T>
where
    T: PrimInt + SampleUniform + Hash,
{
    assert!(
        lbound <= ubound,
        "the lower bound must not be greater than the upper bound"
    );

    let range_len = (ubound - lbound)
        .to_usize()
        .expect("the sampled range length must fit in usize");
    assert!(
        count <= range_len,
        "can't sample more unique values than the range length"
    );

    if count == 0 {
        return Vec::new();
    }
    if range_len >= HUGE_RANGE {
        return sample_unique_set(lbound, ubound, count);
    }

    let select_many = count as f64 > 0.6 * range_len as f64;
    let mut is_selected = vec![select_many; range_len];
    let mut numbers = Vec::with_capacity(count);

    let to_idx = |value: T| {
        (value - lbound)
            .to_usize()
            .expect("the value offset fits in usize")
    };

    if !select_many {
        // Floyd's algorithm with a dense marker vector.
        let mut limit = ubound - T::from(count).expect("count fits in the integer type");
        while limit < ubound {
            let n = random_int(lbound, limit);
            let chosen = if is_selected[to_idx(n)] { limit } else { n };
            is_selected[to_idx(chosen)] = true;
            numbers.push(chosen);
            limit = limit + T::one();
        }
    } else {
        // Select the complement instead when most of the range is wanted.
        let rcount = range_len - count;
        let mut limit = ubound - T::from(rcount).expect("count fits in the integer type");
        while limit < ubound {
            let n = random_int(lbound, limit);
            if is_selected[to_idx(n)] {
                is_selected[to_idx(n)] = false;
            } else {
                is_selected[to_idx(limit)] = false;
            }
            limit = limit + T::one();
        }
        for (offset, selected) in is_selected.iter().enumerate() {
            if *selected {
                numbers.push(lbound + T::from(offset).expect("offset fits in the integer type"));
            }
        }
    }

    numbers
}

fn sample_unique_set<T>(lbound: T, ubound: T, count: usize) -> Vec<T>
where
    T: PrimInt + SampleUniform + Hash,
{
    let mut selected: HashSet<T> = HashSet::with_capacity(count);
    let mut numbers = Vec::with_capacity(count);

    let mut limit = ubound - T::from(count).expect("count fits in the integer type");
    while limit < ubound {
        let n = random_int(lbound, limit);
        let chosen = if selected.contains(&n) { limit } else { n };
        selected.insert(chosen);
        numbers.push(chosen);
        limit = limit + T::one();
    }

    numbers
}

/// Select an index based on a discrete, non-decreasing cdf.
///
/// Returns the index of the first cdf entry not smaller than a uniform draw
/// from `[0, cdf.last()]`; the last entry is used instead of `1.0` so cdfs
/// that don't sum exactly to one still work.
pub fn sample_cdf(cdf: &[f64]) -> usize {
    assert!(!cdf.is_empty(), "the cdf must not be empty");

    let limit = random_real_range(0.0, cdf[cdf.len() - 1]);
    cdf.partition_point(|&x| x < limit).min(cdf.len() - 1)
}

/// Generate a point from a uniform distribution on the unit `dim`-simplex.
pub fn random_simplex_point(dim: usize) -> Array1<f64> {
    assert!(dim > 0, "the dimension must be at least 1");

    let mut point = Array1::zeros(dim);
    let mut sum = 0.0;
    for coord in point.iter_mut() {
        // Exponential spacings; 1 - U is in (0, 1] so the log stays finite.
        let u: f64 = with_prng(|rng| rng.random());
        *coord = -f64::ln(1.0 - u);
        sum += *coord;
    }
    if sum == 0.0 {
        point.fill(1.0 / dim as f64);
    } else {
        point /= sum;
    }
    point
}
