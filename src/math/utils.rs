//! Word-sized modular arithmetic shared by the NTT kernel, the prime search
//! and the encoders.

#[inline]
pub fn add_mod(a: u64, b: u64, modulus: u64) -> u64 {
    let sum = a + b;
    if sum >= modulus { sum - modulus } else { sum }
}

#[inline]
pub fn sub_mod(a: u64, b: u64, modulus: u64) -> u64 {
    if a >= b { a - b } else { a + modulus - b }
}

#[inline]
pub fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// Computes `base^exp mod modulus` via binary exponentiation.
pub fn mod_pow(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 0, "mod_pow: modulus must be positive");
    if modulus == 1 {
        return 0;
    }
    let mut acc = 1u64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mul_mod(acc, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exp >>= 1;
    }
    acc
}

/// Inverse of `value` modulo `modulus`, or `None` when they share a factor.
pub fn mod_inverse(value: u64, modulus: u64) -> Option<u64> {
    if modulus < 2 {
        return None;
    }
    let (mut old_r, mut r) = ((value % modulus) as i128, modulus as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(modulus as i128) as u64)
}

/// Maps a residue in `[0, modulus)` to its representative in
/// `(-modulus/2, modulus/2]`.
#[inline]
pub fn center(value: u64, modulus: u64) -> i64 {
    if value > modulus / 2 {
        -((modulus - value) as i64)
    } else {
        value as i64
    }
}

/// Reduces a signed integer into `[0, modulus)`.
#[inline]
pub fn reduce_signed(value: i128, modulus: u64) -> u64 {
    value.rem_euclid(modulus as i128) as u64
}

pub fn reverse_bits(value: usize, bit_count: usize) -> usize {
    if bit_count == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS as usize - bit_count)
}

/// Number of significant bits in `value` (`0` for zero).
#[inline]
pub fn bit_length(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}
