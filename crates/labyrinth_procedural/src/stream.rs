//! # Random Stream
//!
//! The generator's private source of randomness.
//!
//! ## Determinism Guarantee
//!
//! Each session owns its own [`RandomStream`]; nothing outside the session
//! can draw from it. Other systems may consume as much randomness as they
//! like between two steps without moving the generator's sequence, so a
//! seed reproduces the same level whether it is generated in one call or
//! stepped across many frames.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{GenerationError, GenerationResult};

/// Seeded random stream owned by one generation session.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform index into a collection of `len` items. `None` when empty.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }

    /// Shuffles `items` in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Uniform angle in `[0, 360)` degrees.
    pub fn angle_degrees(&mut self) -> f32 {
        self.rng.gen_range(0.0..360.0)
    }

    /// Raw draw.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Position in the underlying ChaCha stream (in 32-bit words).
    ///
    /// Two streams with the same seed and word position produce the same
    /// future draws.
    #[must_use]
    pub fn word_pos(&self) -> u128 {
        self.rng.get_word_pos()
    }
}

/// Fresh seed from the operating system.
///
/// # Errors
///
/// Returns [`GenerationError::Entropy`] if the OS source is unavailable.
pub fn entropy_seed() -> GenerationResult<u64> {
    getrandom::u64().map_err(|e| GenerationError::Entropy(e.to_string()))
}
