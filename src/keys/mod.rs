pub mod generator;
pub mod public_key;
pub mod secret_key;

pub use generator::{DEFAULT_ERROR_STD_DEV, KeyGenConfig, KeyGenError, KeyGenerator};
pub use public_key::PublicKey;
pub use secret_key::SecretKey;
