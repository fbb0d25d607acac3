pub mod crt;
pub mod primes;
pub mod sampling;
pub mod utils;

pub use crt::CrtComposer;
pub use primes::{is_ntt_friendly_prime, is_prime, next_ntt_prime, prev_ntt_prime};
pub use sampling::{ClippedGaussian, sparse_ternary, ternary, uniform_residues};
pub use utils::{add_mod, mod_inverse, mod_pow, mul_mod, sub_mod};
