use thiserror::Error;

use super::SchemeKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("ring degree must be a power of two in [{min}, {max}], got {degree}")]
    InvalidDegree {
        degree: usize,
        min: usize,
        max: usize,
    },
    #[error("no default modulus chain is defined for degree {degree}")]
    NoDefaultProfile { degree: usize },
    #[error("modulus chain must contain at least one prime")]
    EmptyModulusChain,
    #[error("modulus bit size {bits} is outside [{min}, {max}]")]
    InvalidModulusBits { bits: u32, min: u32, max: u32 },
    #[error("coefficient modulus {modulus} is not prime")]
    NonPrimeModulus { modulus: u64 },
    #[error("coefficient modulus {modulus} is not congruent to 1 mod {two_n}")]
    NotNttFriendly { modulus: u64, two_n: u64 },
    #[error("coefficient modulus {modulus} appears more than once")]
    DuplicateModulus { modulus: u64 },
    #[error("modulus chain spans {bits} bits, above the {max}-bit limit")]
    ChainTooLarge { bits: u32, max: u32 },
    #[error("ran out of {bits}-bit NTT-friendly primes for degree {degree}")]
    NoSuitableCoeffModulus { bits: u32, degree: usize },
    #[error("{scheme} requires a plaintext modulus")]
    MissingPlainModulus { scheme: SchemeKind },
    #[error("{scheme} does not take a plaintext modulus")]
    UnexpectedPlainModulus { scheme: SchemeKind },
    #[error("invalid plaintext modulus {modulus}: {reason}")]
    InvalidPlainModulus { modulus: u64, reason: String },
    #[error("no {bits}-bit batching prime exists for degree {degree} in the search window")]
    NoSuitablePlaintextModulus { bits: u32, degree: usize },
}

pub type ParameterResult<T> = Result<T, ParameterError>;
