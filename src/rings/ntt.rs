use crate::math::{
    is_ntt_friendly_prime,
    utils::{add_mod, mod_inverse, mod_pow, mul_mod, reverse_bits, sub_mod},
};

use super::{
    errors::{RingError, RingResult},
    traits::RingArithmetic,
};

/// Precomputed twiddles for the negacyclic NTT of length `N` modulo one prime.
///
/// The transform twists by `ψ^i`, runs a cyclic Cooley-Tukey NTT with
/// `ω = ψ²`, and therefore lands on the evaluations at `ψ^(2k+1)` in natural
/// order. The inverse runs the same butterfly with `ω⁻¹` and folds `N⁻¹`
/// into the untwist.
#[derive(Debug, Clone)]
pub struct NttTable {
    degree: usize,
    modulus: u64,
    psi: u64,
    twist: Vec<u64>,
    untwist: Vec<u64>,
    omega_powers: Vec<u64>,
    omega_inv_powers: Vec<u64>,
}

impl NttTable {
    pub fn new(degree: usize, modulus: u64) -> RingResult<Self> {
        if degree < 2 || !degree.is_power_of_two() {
            return Err(RingError::InvalidDegree { degree });
        }
        if !is_ntt_friendly_prime(modulus, degree as u64) {
            return Err(RingError::NonNttFriendlyModulus { modulus, degree });
        }
        let non_friendly = RingError::NonNttFriendlyModulus { modulus, degree };

        let psi = find_primitive_root(modulus, 2 * degree as u64).ok_or(non_friendly.clone())?;
        let psi_inv = mod_inverse(psi, modulus).ok_or(non_friendly.clone())?;
        let n_inv = mod_inverse(degree as u64, modulus).ok_or(non_friendly)?;
        let omega = mul_mod(psi, psi, modulus);
        let omega_inv = mul_mod(psi_inv, psi_inv, modulus);

        let twist = powers(psi, degree, modulus);
        let untwist = powers(psi_inv, degree, modulus)
            .into_iter()
            .map(|p| mul_mod(p, n_inv, modulus))
            .collect();

        Ok(Self {
            degree,
            modulus,
            psi,
            twist,
            untwist,
            omega_powers: powers(omega, degree / 2, modulus),
            omega_inv_powers: powers(omega_inv, degree / 2, modulus),
        })
    }

    /// The primitive `2N`-th root of unity the slots are indexed by.
    pub fn psi(&self) -> u64 {
        self.psi
    }

    /// Pointwise product of two NTT-domain vectors, written into `lhs`.
    pub fn pointwise_mul_assign(&self, lhs: &mut [u64], rhs: &[u64]) {
        debug_assert_eq!(lhs.len(), rhs.len());
        for (a, &b) in lhs.iter_mut().zip(rhs) {
            *a = mul_mod(*a, b, self.modulus);
        }
    }
}

impl RingArithmetic for NttTable {
    fn degree(&self) -> usize {
        self.degree
    }

    fn modulus(&self) -> u64 {
        self.modulus
    }

    fn forward_in_place(&self, values: &mut [u64]) {
        debug_assert_eq!(values.len(), self.degree);
        for (v, &w) in values.iter_mut().zip(&self.twist) {
            *v = mul_mod(*v, w, self.modulus);
        }
        bit_reverse_permute(values);
        cooley_tukey(values, &self.omega_powers, self.modulus);
    }

    fn inverse_in_place(&self, values: &mut [u64]) {
        debug_assert_eq!(values.len(), self.degree);
        bit_reverse_permute(values);
        cooley_tukey(values, &self.omega_inv_powers, self.modulus);
        for (v, &w) in values.iter_mut().zip(&self.untwist) {
            *v = mul_mod(*v, w, self.modulus);
        }
    }
}

// ─── Kernels ─────────────────────────────────────────────────────────────────

fn powers(base: u64, count: usize, modulus: u64) -> Vec<u64> {
    let mut out = Vec::with_capacity(count);
    let mut acc = 1u64;
    for _ in 0..count {
        out.push(acc);
        acc = mul_mod(acc, base, modulus);
    }
    out
}

/// Iterative radix-2 butterfly over bit-reversed input; `roots[k] = ω^k`.
fn cooley_tukey(values: &mut [u64], roots: &[u64], modulus: u64) {
    let n = values.len();
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = n / len;
        for start in (0..n).step_by(len) {
            for offset in 0..half {
                let left = start + offset;
                let right = left + half;
                let t = mul_mod(values[right], roots[offset * step], modulus);
                let u = values[left];
                values[left] = add_mod(u, t, modulus);
                values[right] = sub_mod(u, t, modulus);
            }
        }
        len *= 2;
    }
}

fn bit_reverse_permute(values: &mut [u64]) {
    let bits = values.len().trailing_zeros() as usize;
    for i in 0..values.len() {
        let j = reverse_bits(i, bits);
        if i < j {
            values.swap(i, j);
        }
    }
}

/// Smallest-candidate primitive `order`-th root of unity, `order` a power of two.
fn find_primitive_root(modulus: u64, order: u64) -> Option<u64> {
    if (modulus - 1) % order != 0 {
        return None;
    }
    let exponent = (modulus - 1) / order;
    (2..modulus)
        .map(|candidate| mod_pow(candidate, exponent, modulus))
        .find(|&root| mod_pow(root, order / 2, modulus) == modulus - 1)
}
