//! Seedable random choices.
//!
//! Symbol assignment, the fallback move and `{{random:...}}` template picks all
//! draw from one [`Dice`] handle so tests can script or seed every outcome.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Source of uniform choices.
pub trait RandomSource: Send {
    /// Uniform index in `0..len`. Callers never pass `0`.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Fair coin.
    fn coin_flip(&mut self) -> bool {
        self.pick_index(2) == 0
    }
}

/// ChaCha8-backed source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    inner: ChaCha8Rng,
}

impl SeededRandom {
    /// Deterministic stream for a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    fn coin_flip(&mut self) -> bool {
        self.inner.gen_bool(0.5)
    }
}

/// Shared, cloneable handle over a [`RandomSource`].
#[derive(Clone)]
pub struct Dice {
    source: Arc<Mutex<Box<dyn RandomSource>>>,
}

impl Dice {
    /// Wraps any source.
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self {
            source: Arc::new(Mutex::new(Box::new(source))),
        }
    }

    /// Deterministic dice.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededRandom::new(seed))
    }

    /// Entropy-seeded dice.
    pub fn from_entropy() -> Self {
        Self::new(SeededRandom::from_entropy())
    }

    /// Picks one element uniformly; `None` for an empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.lock().pick_index(items.len());
        items.get(index)
    }

    /// Fair coin.
    pub fn coin_flip(&self) -> bool {
        self.lock().coin_flip()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Box<dyn RandomSource>> {
        self.source.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dice").finish_non_exhaustive()
    }
}
