use thiserror::Error;

use crate::{
    ciphertext::ModSwitchError,
    crypto::{DecryptError, EncryptError},
    encoding::EncodeError,
    keys::KeyGenError,
    params::{Fingerprint, ParameterError},
    random::EntropyError,
    rings::RingError,
    serialize::FormatError,
};

/// Two objects derived from different parameter sets met in one operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("parameter mismatch: expected fingerprint {expected}, found {found}")]
pub struct KeyMismatchError {
    pub expected: Fingerprint,
    pub found: Fingerprint,
}

/// Any failure surfaced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    KeyGen(#[from] KeyGenError),
    #[error(transparent)]
    KeyMismatch(#[from] KeyMismatchError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Encrypt(#[from] EncryptError),
    #[error(transparent)]
    Decrypt(#[from] DecryptError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    ModSwitch(#[from] ModSwitchError),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    #[error(transparent)]
    Ring(#[from] RingError),
}

pub type Result<T> = std::result::Result<T, Error>;
