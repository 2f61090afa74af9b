//! Random PIN generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotkeeper_core::{
    Error, Pin, Result,
    constants::{MAX_PIN, MAX_PIN_DRAWS, MIN_PIN},
};

/// Draws 4-digit PINs uniformly from `MIN_PIN..=MAX_PIN`.
///
/// The generator is seeded once, either from OS entropy or from an explicit
/// seed (useful for reproducible tests and demos).
///
/// # Examples
///
/// ```
/// use slotkeeper_storage::PinGenerator;
///
/// let mut generator = PinGenerator::from_seed(7);
/// let first = generator.generate(&[]).unwrap();
/// let second = generator.generate(&[first]).unwrap();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct PinGenerator {
    rng: StdRng,
}

impl PinGenerator {
    /// Seed from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed from a fixed value.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a PIN that is not in `exclude`.
    ///
    /// # Errors
    ///
    /// Returns `Error::PinSpaceExhausted` if no acceptable PIN was drawn in
    /// `MAX_PIN_DRAWS` attempts.
    pub fn generate(&mut self, exclude: &[Pin]) -> Result<Pin> {
        for _ in 0..MAX_PIN_DRAWS {
            let pin = Pin::new(self.rng.gen_range(MIN_PIN..=MAX_PIN))?;
            if !exclude.contains(&pin) {
                return Ok(pin);
            }
        }

        Err(Error::PinSpaceExhausted {
            attempts: MAX_PIN_DRAWS,
        })
    }
}
