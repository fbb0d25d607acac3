use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::{
    errors::KeyMismatchError,
    params::{Fingerprint, ParameterSet, SchemeKind},
    rings::{RingError, RnsPoly},
    serialize::{self, FormatError, ObjectKind},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModSwitchError {
    #[error("{scheme} ciphertexts do not switch moduli")]
    NotPermitted { scheme: SchemeKind },
    #[error("ciphertext is already at level 0")]
    AtLowestLevel,
    #[error("cannot switch from level {current} to level {target}")]
    InvalidTarget { current: usize, target: usize },
    #[error(transparent)]
    KeyMismatch(#[from] KeyMismatchError),
    #[error(transparent)]
    Ring(#[from] RingError),
}

/// An RLWE ciphertext `(c0, c1)` with `c0 + c1·s ≈ Δ·m`.
///
/// Both components live in coefficient domain over the first `level + 1`
/// primes of the chain.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    fingerprint: Fingerprint,
    level: usize,
    scale: f64,
    c0: RnsPoly,
    c1: RnsPoly,
}

impl Ciphertext {
    pub(crate) fn new(
        fingerprint: Fingerprint,
        level: usize,
        scale: f64,
        c0: RnsPoly,
        c1: RnsPoly,
    ) -> Self {
        debug_assert!(!c0.is_ntt_domain() && !c1.is_ntt_domain());
        debug_assert_eq!(c0.channels().len(), level + 1);
        Self {
            fingerprint,
            level,
            scale,
            c0,
            c1,
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn c0(&self) -> &RnsPoly {
        &self.c0
    }

    pub fn c1(&self) -> &RnsPoly {
        &self.c1
    }

    /// Drops the last active prime `q_l`, replacing each component `c` by
    /// `round(c / q_l)`.
    ///
    /// Only [`SchemeKind::TimelineInteger`] ciphertexts walk down the chain.
    pub fn mod_switch_to_next(&self, params: &ParameterSet) -> Result<Self, ModSwitchError> {
        params.check_fingerprint(self.fingerprint)?;
        if params.scheme() != SchemeKind::TimelineInteger {
            return Err(ModSwitchError::NotPermitted {
                scheme: params.scheme(),
            });
        }
        if self.level == 0 {
            return Err(ModSwitchError::AtLowestLevel);
        }
        let target = self.level - 1;
        let basis = params
            .basis_at(target)
            .ok_or(ModSwitchError::InvalidTarget {
                current: self.level,
                target,
            })?;

        let c0 = self.c0.divide_and_round_last(Arc::clone(basis))?;
        let c1 = self.c1.divide_and_round_last(Arc::clone(basis))?;
        debug!(
            fingerprint = %self.fingerprint,
            from = self.level,
            to = target,
            "ciphertext switched to next modulus"
        );
        Ok(Self::new(self.fingerprint, target, self.scale, c0, c1))
    }

    /// Repeats [`Ciphertext::mod_switch_to_next`] until `level` is reached.
    pub fn mod_switch_to(&self, params: &ParameterSet, level: usize) -> Result<Self, ModSwitchError> {
        if level > self.level {
            return Err(ModSwitchError::InvalidTarget {
                current: self.level,
                target: level,
            });
        }
        let mut current = self.clone();
        if level == self.level {
            params.check_fingerprint(self.fingerprint)?;
            return Ok(current);
        }
        while current.level > level {
            current = current.mod_switch_to_next(params)?;
        }
        Ok(current)
    }

    /// Serializes into the versioned little-endian layout.
    pub fn export(&self) -> Vec<u8> {
        serialize::write_object(
            ObjectKind::Ciphertext,
            self.fingerprint,
            self.level,
            self.scale,
            &[self.c0.channels(), self.c1.channels()],
        )
    }

    /// Parses bytes produced by [`Ciphertext::export`] against `params`.
    pub fn import(bytes: &[u8], params: &ParameterSet) -> Result<Self, FormatError> {
        let object = serialize::read_object(bytes, ObjectKind::Ciphertext, params)?;
        let basis = params
            .basis_at(object.level)
            .ok_or(FormatError::InvalidLevel {
                level: object.level as u32,
                max_level: params.max_level(),
            })?;
        let mut polys = object.polys.into_iter().map(|channels| {
            RnsPoly::from_channels(channels, Arc::clone(basis), false).map_err(|err| {
                FormatError::ShapeMismatch {
                    reason: err.to_string(),
                }
            })
        });
        let (Some(c0), Some(c1)) = (polys.next(), polys.next()) else {
            return Err(FormatError::ShapeMismatch {
                reason: "expected two polynomials".into(),
            });
        };
        Ok(Self::new(
            params.fingerprint(),
            object.level,
            object.scale,
            c0?,
            c1?,
        ))
    }
}
