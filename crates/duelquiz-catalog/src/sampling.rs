//! Random selection with a documented distribution.
//!
//! Both selections the catalog needs are uniform:
//!
//! - [`pick_uniform`]: one item, each with probability `1 / n`.
//! - [`sample_without_replacement`]: `min(count, n)` distinct positions of
//!   the pool, every subset of that size equally likely.
//!
//! The functions take any `Rng`, so tests pass a seeded `StdRng` and get
//! the same answer every run. Production code goes through
//! [`RandomSource::entropy`], which uses the thread-local generator and
//! therefore never repeats a sequence.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};

/// Picks one item uniformly at random. `None` for an empty slice.
pub fn pick_uniform<T: Clone, R: Rng + ?Sized>(
    items: &[T],
    rng: &mut R,
) -> Option<T> {
    items.choose(rng).cloned()
}

/// Draws up to `count` items without replacement.
///
/// Returns the whole pool when it holds `count` items or fewer. The order
/// of the returned items is not meaningful.
pub fn sample_without_replacement<T: Clone, R: Rng + ?Sized>(
    pool: &[T],
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    pool.choose_multiple(rng, count).cloned().collect()
}

/// Where a component gets its randomness from.
///
/// `entropy()` in production, `seeded(n)` when a test needs a
/// reproducible sequence.
#[derive(Debug, Default)]
pub struct RandomSource {
    seeded: Option<Mutex<StdRng>>,
}

impl RandomSource {
    /// Thread-local, OS-seeded randomness. No two runs agree.
    pub fn entropy() -> Self {
        Self { seeded: None }
    }

    /// A deterministic generator. Same seed, same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Runs `f` with this source's generator.
    ///
    /// Keep `f` synchronous: the generator must not be held across an
    /// `.await`.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match &self.seeded {
            Some(rng) => {
                let mut guard =
                    rng.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut *guard)
            }
            None => f(&mut rand::rng()),
        }
    }
}
