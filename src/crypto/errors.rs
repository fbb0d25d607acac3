use thiserror::Error;

use crate::{errors::KeyMismatchError, random::EntropyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncryptError {
    #[error(transparent)]
    KeyMismatch(#[from] KeyMismatchError),

    #[error("encryption needs entropy: {0}")]
    InsufficientEntropy(#[from] EntropyError),

    #[error("invalid plaintext: {reason}")]
    InvalidPlaintext { reason: String },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptError {
    /// The noise reached the message; the decrypted value cannot be trusted.
    #[error("noise budget exhausted")]
    NoiseBudgetExhausted,
}
