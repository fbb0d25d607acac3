//! Lattice-based homomorphic encryption over `Z_q[X]/(X^N + 1)`.
//!
//! Three schemes share one pipeline: build a [`ParameterSet`], generate keys
//! with [`KeyGenerator`], encode with [`Encoder`], then [`Encryptor`] and
//! [`Decryptor`].
//!
//! ```no_run
//! use lattice_he::{
//!     Decryptor, Encoder, Encryptor, KeyGenerator, ParameterSet, PlainModulus, SchemeKind,
//!     SlotInput, Slots,
//! };
//! use rand::rngs::OsRng;
//!
//! let params = ParameterSet::builder(SchemeKind::BatchedInteger)
//!     .plain_modulus(PlainModulus::Explicit(786433))
//!     .build()?;
//! let (secret_key, public_key) = KeyGenerator::new(params.clone()).generate(&mut OsRng)?;
//!
//! let encoder = Encoder::new(params.clone())?;
//! let values: Vec<u64> = (0..encoder.slot_count() as u64).collect();
//! let plaintext = encoder.encode(SlotInput::Integers(&values))?;
//! let ciphertext = Encryptor::asymmetric(&public_key).encrypt(&plaintext, &mut OsRng)?;
//!
//! let decrypted = Decryptor::new(&secret_key).decrypt(&ciphertext)?.into_checked()?;
//! assert_eq!(encoder.decode(&decrypted)?, Slots::Integers(values));
//! # Ok::<(), lattice_he::Error>(())
//! ```

pub mod ciphertext;
pub mod crypto;
pub mod encoding;
pub mod errors;
pub mod keys;
pub mod math;
pub mod params;
pub mod plaintext;
pub mod random;
pub mod rings;
pub mod serialize;

pub use ciphertext::{Ciphertext, ModSwitchError};
pub use crypto::{DecryptError, Decryption, Decryptor, EncryptError, Encryptor};
pub use encoding::{
    ApproxEncoder, BatchEncoder, EncodeError, Encoder, EncoderConfig, SlotInput, Slots,
};
pub use errors::{Error, KeyMismatchError, Result};
pub use keys::{KeyGenConfig, KeyGenError, KeyGenerator, PublicKey, SecretKey};
pub use params::{
    CoeffModulus, Fingerprint, ParameterError, ParameterSet, ParameterSetBuilder, PlainModulus,
    SchemeKind,
};
pub use plaintext::Plaintext;
pub use random::{EntropyError, RandomSource};
pub use num_complex::Complex64;
pub use serialize::FormatError;
