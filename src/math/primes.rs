//! Prime search for modulus chains and batching plaintext moduli.
//!
//! Primality uses Miller-Rabin with a fixed base set, which is deterministic
//! over the whole `u64` range. Candidates are always visited in the
//! arithmetic progression `1 (mod 2N)` so every prime found supports a
//! negacyclic NTT of length `N`.

use super::utils::{mod_pow, mul_mod};

// Deterministic for all n < 3.3 * 10^24.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Returns `true` if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let r = (n - 1).trailing_zeros();
    let d = (n - 1) >> r;
    'bases: for &a in MILLER_RABIN_BASES.iter() {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// `true` when `p` is prime and `p ≡ 1 (mod 2 * degree)`.
pub fn is_ntt_friendly_prime(p: u64, degree: u64) -> bool {
    match degree.checked_mul(2) {
        Some(two_n) if two_n > 0 => p % two_n == 1 && is_prime(p),
        _ => false,
    }
}

/// Smallest `x >= value` with `x ≡ 1 (mod step)`.
fn align_up(value: u64, step: u64) -> Option<u64> {
    let remainder = value % step;
    if remainder == 1 {
        return Some(value);
    }
    value.checked_add((step + 1 - remainder) % step)
}

/// Largest `x <= value` with `x ≡ 1 (mod step)`.
fn align_down(value: u64, step: u64) -> Option<u64> {
    let remainder = value % step;
    value.checked_sub((remainder + step - 1) % step)
}

/// Largest NTT-friendly prime strictly below `bound`.
pub fn prev_ntt_prime(bound: u64, degree: u64) -> Option<u64> {
    let step = degree.checked_mul(2)?;
    if step < 2 || bound <= 2 {
        return None;
    }
    let mut candidate = align_down(bound - 1, step)?;
    while candidate > 2 {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
    None
}

/// Smallest NTT-friendly prime `>= start`, visiting at most `max_candidates`
/// members of the progression and never reaching `limit`.
pub fn next_ntt_prime(start: u64, degree: u64, limit: u64, max_candidates: usize) -> Option<u64> {
    let step = degree.checked_mul(2)?;
    if step < 2 {
        return None;
    }
    let mut candidate = align_up(start, step)?;
    for _ in 0..max_candidates {
        if candidate >= limit {
            return None;
        }
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_add(step)?;
    }
    None
}
