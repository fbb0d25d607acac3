//! Polynomial arithmetic in `Z_q[X]/(X^N + 1)`: the single-prime NTT kernel
//! and the RNS container built on top of it.

pub mod basis;
pub mod errors;
pub mod ntt;
pub mod poly;
pub mod traits;

pub use basis::RnsBasis;
pub use errors::{RingError, RingResult};
pub use ntt::NttTable;
pub use poly::RnsPoly;
pub use traits::RingArithmetic;
