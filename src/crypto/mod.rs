//! Encryption under a public or secret key, and decryption with a
//! noise-budget report.

mod decryptor;
mod encryptor;
mod errors;

pub use decryptor::{Decryption, Decryptor};
pub use encryptor::Encryptor;
pub use errors::{DecryptError, EncryptError};
