//! Exact Chinese-remainder composition of RNS residues into a 512-bit integer.

use crypto_bigint::{NonZero, U512};

use super::utils::{mod_inverse, mul_mod};

/// Precomputed CRT data for one prefix of the modulus chain.
///
/// Holds `Q = ∏ q_i`, the punctured products `Q / q_i` and their inverses
/// `(Q / q_i)^{-1} mod q_i`, so a residue vector `r` composes as
/// `x = Σ r_i · inv_i · (Q / q_i) mod Q`.
#[derive(Debug, Clone)]
pub struct CrtComposer {
    moduli: Vec<u64>,
    product: NonZero<U512>,
    punctured: Vec<U512>,
    punctured_inverses: Vec<u64>,
    bits: u32,
}

impl CrtComposer {
    /// Returns `None` for an empty or non-coprime set, or when `2 * t * Q`
    /// could overflow 512 bits for any 64-bit `t`.
    pub fn new(moduli: &[u64]) -> Option<Self> {
        if moduli.is_empty() || moduli.iter().any(|&q| q < 2) {
            return None;
        }
        let total_bits: u32 = moduli.iter().map(|&q| 64 - q.leading_zeros()).sum();
        if total_bits > 512 - 66 {
            return None;
        }

        let mut product = U512::ONE;
        for &q in moduli {
            product = product.wrapping_mul(&U512::from_u64(q));
        }

        let mut punctured = Vec::with_capacity(moduli.len());
        let mut punctured_inverses = Vec::with_capacity(moduli.len());
        for (i, &q) in moduli.iter().enumerate() {
            let mut partial = U512::ONE;
            let mut partial_mod_q = 1u64;
            for (j, &other) in moduli.iter().enumerate() {
                if i != j {
                    partial = partial.wrapping_mul(&U512::from_u64(other));
                    partial_mod_q = mul_mod(partial_mod_q, other % q, q);
                }
            }
            punctured_inverses.push(mod_inverse(partial_mod_q, q)?);
            punctured.push(partial);
        }

        let bits = product.bits() as u32;
        Some(Self {
            moduli: moduli.to_vec(),
            product: Option::from(NonZero::new(product))?,
            punctured,
            punctured_inverses,
            bits,
        })
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn product(&self) -> &U512 {
        &self.product
    }

    /// Bit length of `Q`.
    pub fn modulus_bits(&self) -> u32 {
        self.bits
    }

    /// Composes residues into the unique `x ∈ [0, Q)`.
    pub fn compose(&self, residues: &[u64]) -> U512 {
        debug_assert_eq!(residues.len(), self.moduli.len());
        let mut acc = U512::ZERO;
        for ((&r, &q), (inv, partial)) in residues
            .iter()
            .zip(&self.moduli)
            .zip(self.punctured_inverses.iter().zip(&self.punctured))
        {
            let term = mul_mod(r, *inv, q);
            acc = acc.wrapping_add(&partial.wrapping_mul(&U512::from_u64(term)));
        }
        // Σ term_i · (Q / q_i) < k · Q, so one division finishes the reduction.
        acc.div_rem(&self.product).1
    }

    /// `true` when `x ∈ [0, Q)` represents a negative value, i.e. `x > Q/2`.
    fn is_upper_half(&self, value: &U512) -> bool {
        // Q is odd, so 2x never equals Q.
        value.wrapping_add(value) > *self.product()
    }

    /// `|[x]_Q|`, the magnitude of the centered representative.
    pub fn centered_magnitude(&self, value: &U512) -> U512 {
        if self.is_upper_half(value) {
            self.product().wrapping_sub(value)
        } else {
            *value
        }
    }

    /// Bit length of the centered representative of `x`.
    pub fn centered_bits(&self, value: &U512) -> u32 {
        self.centered_magnitude(value).bits() as u32
    }

    /// `(multiplier · x) mod Q`.
    pub fn scale_reduce(&self, value: &U512, multiplier: u64) -> U512 {
        value
            .wrapping_mul(&U512::from_u64(multiplier))
            .div_rem(&self.product)
            .1
    }

    /// `round(t · x / Q) mod t` for `x ∈ [0, Q)`.
    pub fn scale_and_round(&self, value: &U512, t: u64) -> u64 {
        // floor((2·t·x + Q) / (2·Q))
        let scaled = value.wrapping_mul(&U512::from_u64(t));
        let numerator = scaled.wrapping_add(&scaled).wrapping_add(self.product());
        let two_q = self.product().wrapping_add(self.product());
        let Some(two_q) = Option::<NonZero<U512>>::from(NonZero::new(two_q)) else {
            return 0;
        };
        let quotient = numerator.div_rem(&two_q).0;
        quotient.as_words()[0] % t
    }

    /// Centered representative of `x` as a float.
    pub fn centered_f64(&self, value: &U512) -> f64 {
        let magnitude = to_f64(&self.centered_magnitude(value));
        if self.is_upper_half(value) { -magnitude } else { magnitude }
    }

    /// `floor(Q / divisor)` and `Q mod divisor`.
    pub fn divide_modulus(&self, divisor: u64) -> Option<(U512, u64)> {
        let divisor_nz = Option::<NonZero<U512>>::from(NonZero::new(U512::from_u64(divisor)))?;
        let (quotient, remainder) = self.product.div_rem(&divisor_nz);
        Some((quotient, remainder.as_words()[0]))
    }
}

/// Residue of a 512-bit integer modulo a word-sized modulus.
pub fn reduce_u512(value: &U512, modulus: u64) -> u64 {
    match Option::<NonZero<U512>>::from(NonZero::new(U512::from_u64(modulus))) {
        Some(modulus) => value.div_rem(&modulus).1.as_words()[0],
        None => 0,
    }
}

pub fn to_f64(value: &U512) -> f64 {
    let mut out = 0.0f64;
    for &word in value.as_words().iter().rev() {
        out = out * 18_446_744_073_709_551_616.0 + word as f64;
    }
    out
}
