//! Slot encoders. Integer schemes batch `N` values modulo `t` through the
//! NTT over `Z_t`; the approximate scheme maps `N/2` complex values through
//! the canonical embedding.

mod approx;
mod batch;
pub mod special_fft;

use std::sync::Arc;

use num_complex::Complex64;
use thiserror::Error;

pub use approx::{ApproxEncoder, EncoderConfig};
pub use batch::BatchEncoder;
pub use special_fft::CanonicalEmbedding;

use crate::{
    Plaintext,
    errors::KeyMismatchError,
    params::{ParameterSet, SchemeKind},
};

pub type EncodeResult<T> = Result<T, EncodeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("expected exactly {expected} slot values, got {actual}")]
    SlotCountMismatch { expected: usize, actual: usize },

    #[error("input too long: got {got}, max {max}")]
    TooManySlots { got: usize, max: usize },

    #[error("scale {scale} out of range: {reason}")]
    ScaleOutOfRange { scale: f64, reason: String },

    #[error("{scheme} parameters cannot encode {input}")]
    UnsupportedInput {
        scheme: SchemeKind,
        input: &'static str,
    },

    #[error(transparent)]
    KeyMismatch(#[from] KeyMismatchError),

    #[error("malformed plaintext: {reason}")]
    MalformedPlaintext { reason: String },

    #[error("level {level} exceeds max level {max_level}")]
    InvalidLevel { level: usize, max_level: usize },
}

/// Values handed to [`Encoder::encode`].
#[derive(Debug, Clone, Copy)]
pub enum SlotInput<'a> {
    Integers(&'a [u64]),
    Signed(&'a [i64]),
    Real { values: &'a [f64], scale: f64 },
    Complex { values: &'a [Complex64], scale: f64 },
}

impl SlotInput<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Self::Integers(_) => "integer slots",
            Self::Signed(_) => "signed integer slots",
            Self::Real { .. } => "real slots",
            Self::Complex { .. } => "complex slots",
        }
    }
}

/// Values returned by [`Encoder::decode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slots {
    Integers(Vec<u64>),
    Complex(Vec<Complex64>),
}

/// The encoder matching a parameter set's scheme.
#[derive(Debug, Clone)]
pub enum Encoder {
    Batch(BatchEncoder),
    Approximate(ApproxEncoder),
}

impl Encoder {
    pub fn new(params: Arc<ParameterSet>) -> EncodeResult<Self> {
        if params.scheme().is_integer() {
            BatchEncoder::new(params).map(Self::Batch)
        } else {
            ApproxEncoder::new(params).map(Self::Approximate)
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            Self::Batch(encoder) => encoder.slot_count(),
            Self::Approximate(encoder) => encoder.slot_count(),
        }
    }

    pub fn encode(&self, input: SlotInput<'_>) -> EncodeResult<Plaintext> {
        match (self, input) {
            (Self::Batch(encoder), SlotInput::Integers(values)) => encoder.encode(values),
            (Self::Batch(encoder), SlotInput::Signed(values)) => encoder.encode_signed(values),
            (Self::Approximate(encoder), SlotInput::Real { values, scale }) => {
                encoder.encode(values, scale)
            }
            (Self::Approximate(encoder), SlotInput::Complex { values, scale }) => {
                encoder.encode_complex(values, scale)
            }
            (encoder, input) => Err(EncodeError::UnsupportedInput {
                scheme: encoder.params().scheme(),
                input: input.describe(),
            }),
        }
    }

    pub fn decode(&self, plaintext: &Plaintext) -> EncodeResult<Slots> {
        match self {
            Self::Batch(encoder) => encoder.decode(plaintext).map(Slots::Integers),
            Self::Approximate(encoder) => encoder.decode_complex(plaintext).map(Slots::Complex),
        }
    }

    fn params(&self) -> &Arc<ParameterSet> {
        match self {
            Self::Batch(encoder) => encoder.params(),
            Self::Approximate(encoder) => encoder.params(),
        }
    }
}
