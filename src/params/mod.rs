//! Validated, immutable encryption parameters shared by every other component.

mod builder;
mod errors;
mod fingerprint;

use std::{fmt, sync::Arc};

pub use builder::{CoeffModulus, ParameterSetBuilder, PlainModulus, default_bit_sizes};
pub use errors::{ParameterError, ParameterResult};
pub use fingerprint::Fingerprint;

use crate::{
    errors::KeyMismatchError,
    rings::{NttTable, RnsBasis},
};

pub const MIN_DEGREE: usize = 2;
pub const MAX_DEGREE: usize = 16384;
pub const DEFAULT_DEGREE: usize = 4096;
pub const MIN_MODULUS_BITS: u32 = 2;
pub const MAX_MODULUS_BITS: u32 = 60;
pub const MAX_TOTAL_COEFF_BITS: u32 = 440;
/// Upper bound on candidates visited when searching for a batching prime.
pub const PLAIN_MODULUS_SEARCH_WINDOW: usize = 1 << 16;

/// The three supported encryption schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// Batched exact integer arithmetic modulo `t`.
    BatchedInteger,
    /// Exact integer arithmetic whose ciphertexts walk down the modulus chain.
    TimelineInteger,
    /// Approximate fixed-point arithmetic on complex slots.
    ApproximateFixedPoint,
}

impl SchemeKind {
    pub fn is_integer(self) -> bool {
        matches!(self, Self::BatchedInteger | Self::TimelineInteger)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::BatchedInteger => 1,
            Self::TimelineInteger => 2,
            Self::ApproximateFixedPoint => 3,
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BatchedInteger => "BatchedInteger",
            Self::TimelineInteger => "TimelineInteger",
            Self::ApproximateFixedPoint => "ApproximateFixedPoint",
        };
        f.write_str(name)
    }
}

/// Per-level constants for scaling an integer plaintext into the ciphertext
/// modulus as `round(Q_l·m / t) = Δ·m + round((Q_l mod t)·m / t)`: residues
/// of `Δ = floor(Q_l / t)` and `Q_l mod t`.
#[derive(Debug, Clone)]
pub(crate) struct PlainScaling {
    pub delta_residues: Vec<u64>,
    pub modulus_mod_t: u64,
}

/// A validated parameter set.
///
/// Built once through [`ParameterSet::builder`], then shared read-only via
/// `Arc`. Caches one RNS basis per level (level `l` uses the first `l + 1`
/// primes) and, for the integer schemes, the NTT table over `Z_t`.
pub struct ParameterSet {
    scheme: SchemeKind,
    degree: usize,
    coeff_modulus: Vec<u64>,
    plain_modulus: Option<u64>,
    fingerprint: Fingerprint,
    level_bases: Vec<Arc<RnsBasis>>,
    plain_table: Option<NttTable>,
    plain_scaling: Vec<PlainScaling>,
}

impl ParameterSet {
    pub fn builder(scheme: SchemeKind) -> ParameterSetBuilder {
        ParameterSetBuilder::new(scheme)
    }

    pub fn scheme(&self) -> SchemeKind {
        self.scheme
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of independent values a plaintext carries.
    pub fn slot_count(&self) -> usize {
        if self.scheme.is_integer() {
            self.degree
        } else {
            self.degree / 2
        }
    }

    pub fn coeff_modulus(&self) -> &[u64] {
        &self.coeff_modulus
    }

    pub fn plain_modulus(&self) -> Option<u64> {
        self.plain_modulus
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn max_level(&self) -> usize {
        self.coeff_modulus.len() - 1
    }

    pub fn basis_at(&self, level: usize) -> Option<&Arc<RnsBasis>> {
        self.level_bases.get(level)
    }

    pub fn top_basis(&self) -> &Arc<RnsBasis> {
        &self.level_bases[self.max_level()]
    }

    /// Bit length of `Q_level`.
    pub fn coeff_modulus_bits(&self, level: usize) -> Option<u32> {
        self.basis_at(level).map(|basis| basis.modulus_bits())
    }

    pub fn total_coeff_modulus_bits(&self) -> u32 {
        self.top_basis().modulus_bits()
    }

    /// NTT table over `Z_t`; `None` for the approximate scheme.
    pub fn plain_table(&self) -> Option<&NttTable> {
        self.plain_table.as_ref()
    }

    pub(crate) fn plain_scaling(&self, level: usize) -> Option<&PlainScaling> {
        self.plain_scaling.get(level)
    }

    /// Fails unless `found` identifies this parameter set.
    pub fn check_fingerprint(&self, found: Fingerprint) -> Result<(), KeyMismatchError> {
        if found == self.fingerprint {
            Ok(())
        } else {
            Err(KeyMismatchError {
                expected: self.fingerprint,
                found,
            })
        }
    }
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSet")
            .field("scheme", &self.scheme)
            .field("degree", &self.degree)
            .field("coeff_modulus", &self.coeff_modulus)
            .field("plain_modulus", &self.plain_modulus)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ParameterSet {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for ParameterSet {}
