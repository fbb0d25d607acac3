use std::{
    ops::{AddAssign, MulAssign, Neg},
    sync::Arc,
};

use crypto_bigint::U512;
use rand::Rng;
use zeroize::Zeroize;

use super::{
    basis::RnsBasis,
    errors::{RingError, RingResult},
    traits::RingArithmetic,
};
use crate::math::{
    sampling::uniform_residues,
    utils::{add_mod, center, mod_inverse, mul_mod, reduce_signed, sub_mod},
};

/// A polynomial in `Z_{q_0} x … x Z_{q_{L-1}}[X] / (X^N + 1)`.
///
/// Stores one length-`N` residue vector per RNS channel. The `in_ntt_domain`
/// flag tracks whether the vectors hold coefficients or NTT evaluations.
///
/// # Invariants
/// - `channels.len() == basis.channel_count()`
/// - `channels[i].len() == basis.degree()`
/// - Every `channels[i][j] < basis.moduli()[i]`
#[derive(Clone, Debug)]
pub struct RnsPoly {
    channels: Vec<Vec<u64>>,
    basis: Arc<RnsBasis>,
    in_ntt_domain: bool,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl RnsPoly {
    /// Reduces small signed coefficients into every channel.
    pub fn from_signed(coeffs: &[i64], basis: Arc<RnsBasis>) -> Self {
        debug_assert_eq!(coeffs.len(), basis.degree());
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| coeffs.iter().map(|&c| reduce_signed(c as i128, q)).collect())
            .collect();
        Self::new_unchecked(channels, basis, false)
    }

    /// Same as [`RnsPoly::from_signed`] for coefficients up to 127 bits.
    pub fn from_wide(coeffs: &[i128], basis: Arc<RnsBasis>) -> Self {
        debug_assert_eq!(coeffs.len(), basis.degree());
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| coeffs.iter().map(|&c| reduce_signed(c, q)).collect())
            .collect();
        Self::new_unchecked(channels, basis, false)
    }

    /// Creates a polynomial from pre-built channels, checking shape and
    /// reducedness.
    pub fn from_channels(
        channels: Vec<Vec<u64>>,
        basis: Arc<RnsBasis>,
        in_ntt_domain: bool,
    ) -> RingResult<Self> {
        let expected = basis.channel_count();
        if channels.len() != expected {
            return Err(RingError::ChannelCountMismatch {
                expected,
                actual: channels.len(),
            });
        }
        for (channel, &q) in channels.iter().zip(basis.moduli()) {
            if channel.len() != basis.degree() {
                return Err(RingError::LengthMismatch {
                    expected: basis.degree(),
                    actual: channel.len(),
                });
            }
            if let Some(&coefficient) = channel.iter().find(|&&c| c >= q) {
                return Err(RingError::NonReducedCoefficient {
                    coefficient,
                    modulus: q,
                });
            }
        }
        Ok(Self::new_unchecked(channels, basis, in_ntt_domain))
    }

    /// Samples every channel uniformly, which is uniform modulo `Q` by CRT.
    pub fn sample_uniform<R: Rng + ?Sized>(basis: Arc<RnsBasis>, rng: &mut R) -> Self {
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| uniform_residues(q, basis.degree(), rng))
            .collect();
        Self::new_unchecked(channels, basis, false)
    }

    fn new_unchecked(channels: Vec<Vec<u64>>, basis: Arc<RnsBasis>, in_ntt_domain: bool) -> Self {
        Self {
            channels,
            basis,
            in_ntt_domain,
        }
    }
}

// ─── Accessors & domain conversion ───────────────────────────────────────────

impl RnsPoly {
    pub fn channels(&self) -> &[Vec<u64>] {
        &self.channels
    }

    pub fn basis(&self) -> &Arc<RnsBasis> {
        &self.basis
    }

    pub fn degree(&self) -> usize {
        self.basis.degree()
    }

    pub fn is_ntt_domain(&self) -> bool {
        self.in_ntt_domain
    }

    pub fn into_channels(mut self) -> Vec<Vec<u64>> {
        std::mem::take(&mut self.channels)
    }

    /// Converts to NTT domain in-place (no-op if already there).
    pub fn to_ntt_domain(&mut self) {
        if self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).forward_in_place(channel);
        }
        self.in_ntt_domain = true;
    }

    /// Converts to coefficient domain in-place (no-op if already there).
    pub fn to_coeff_domain(&mut self) {
        if !self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            self.basis.ntt_table(ch).inverse_in_place(channel);
        }
        self.in_ntt_domain = false;
    }

    /// Restricts to a prefix basis by discarding the trailing channels.
    ///
    /// Exact in both domains: each channel is independent.
    pub fn restrict_to(&self, basis: Arc<RnsBasis>) -> Self {
        let keep = basis.channel_count();
        debug_assert!(keep <= self.channels.len(), "restrict_to: basis too large");
        debug_assert_eq!(
            basis.moduli(),
            &self.basis.moduli()[..keep],
            "restrict_to: not a prefix basis"
        );
        Self::new_unchecked(self.channels[..keep].to_vec(), basis, self.in_ntt_domain)
    }

    /// Replaces `c` by `round(c / q_last)` over the basis without the last
    /// channel.
    ///
    /// Computed channel-wise as `(c_i - [c]_{q_last}) · q_last⁻¹ mod q_i` with
    /// the centered residue of the dropped channel, which rounds to nearest
    /// since `q_last` is odd.
    pub fn divide_and_round_last(&self, basis: Arc<RnsBasis>) -> RingResult<Self> {
        debug_assert!(!self.in_ntt_domain, "divide_and_round_last: coefficient domain only");
        let channel_count = self.channels.len();
        if channel_count < 2 || basis.channel_count() != channel_count - 1 {
            return Err(RingError::InvalidModDrop {
                drop_count: channel_count.saturating_sub(basis.channel_count()),
                channel_count,
            });
        }
        let last_q = self.basis.moduli()[channel_count - 1];
        let last = &self.channels[channel_count - 1];

        let mut channels = Vec::with_capacity(channel_count - 1);
        for (channel, &q) in self.channels.iter().zip(basis.moduli()) {
            let inv = mod_inverse(last_q % q, q).ok_or(RingError::InvalidBasis)?;
            let reduced = channel
                .iter()
                .zip(last)
                .map(|(&c, &r)| {
                    let r = reduce_signed(center(r, last_q) as i128, q);
                    mul_mod(sub_mod(c, r, q), inv, q)
                })
                .collect();
            channels.push(reduced);
        }
        Ok(Self::new_unchecked(channels, basis, false))
    }

    /// CRT-composes coefficient `index` into `[0, Q)`.
    pub fn compose_coefficient(&self, index: usize, residues: &mut Vec<u64>) -> U512 {
        debug_assert!(!self.in_ntt_domain, "compose_coefficient: coefficient domain only");
        residues.clear();
        residues.extend(self.channels.iter().map(|channel| channel[index]));
        self.basis.crt().compose(residues)
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

impl AddAssign<&RnsPoly> for RnsPoly {
    /// Coefficient-wise addition modulo each `q_i`. Works in both domains.
    fn add_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(self.basis.moduli(), rhs.basis.moduli(), "add_assign: basis mismatch");
        debug_assert_eq!(
            self.in_ntt_domain, rhs.in_ntt_domain,
            "add_assign: domain mismatch"
        );
        for ((channel, other), &q) in self
            .channels
            .iter_mut()
            .zip(&rhs.channels)
            .zip(self.basis.moduli())
        {
            for (a, &b) in channel.iter_mut().zip(other) {
                *a = add_mod(*a, b, q);
            }
        }
    }
}

impl MulAssign<&RnsPoly> for RnsPoly {
    /// Negacyclic product as a pointwise product of NTT evaluations.
    ///
    /// Both operands must be in NTT domain and share the same basis.
    fn mul_assign(&mut self, rhs: &RnsPoly) {
        debug_assert!(
            self.in_ntt_domain && rhs.in_ntt_domain,
            "mul_assign: requires NTT domain; call to_ntt_domain first"
        );
        debug_assert_eq!(self.basis.moduli(), rhs.basis.moduli(), "mul_assign: basis mismatch");
        for (ch, (channel, other)) in self.channels.iter_mut().zip(&rhs.channels).enumerate() {
            self.basis.ntt_table(ch).pointwise_mul_assign(channel, other);
        }
    }
}

impl Neg for RnsPoly {
    type Output = Self;

    /// Coefficient-wise negation modulo each `q_i`. Works in both domains.
    fn neg(mut self) -> Self {
        for (channel, &q) in self.channels.iter_mut().zip(self.basis.moduli()) {
            for c in channel.iter_mut() {
                if *c != 0 {
                    *c = q - *c;
                }
            }
        }
        self
    }
}

impl Zeroize for RnsPoly {
    fn zeroize(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.zeroize();
        }
    }
}
