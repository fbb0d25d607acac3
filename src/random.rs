//! The caller-supplied entropy source and the per-call sampler drawn from it.

use rand_chacha::ChaCha20Rng;
use rand_core::{SeedableRng, TryCryptoRng};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("random source failed: {message}")]
pub struct EntropyError {
    message: String,
}

impl EntropyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A cryptographically secure byte source.
///
/// Implemented for every `TryCryptoRng`, so `OsRng` and seeded `ChaCha20Rng`
/// both work directly.
pub trait RandomSource {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<(), EntropyError>;
}

impl<R: TryCryptoRng + ?Sized> RandomSource for R {
    fn fill(&mut self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        self.try_fill_bytes(buffer)
            .map_err(|err| EntropyError::new(err.to_string()))
    }
}

/// Draws a fresh 32-byte seed and expands it into a local sampler.
pub(crate) fn seeded_sampler<S: RandomSource + ?Sized>(
    source: &mut S,
) -> Result<ChaCha20Rng, EntropyError> {
    let mut seed = Zeroizing::new([0u8; 32]);
    source.fill(seed.as_mut_slice())?;
    Ok(ChaCha20Rng::from_seed(*seed))
}
