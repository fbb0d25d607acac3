use std::sync::Arc;

use crate::{
    params::{Fingerprint, ParameterSet},
    rings::{RingResult, RnsPoly},
    serialize::{self, FormatError, ObjectKind},
};

/// An encoded message, not yet encrypted.
///
/// Integer schemes carry a single channel of `N` coefficients modulo `t` at
/// the top level with scale `1`. The approximate scheme carries one channel
/// per active prime of `level` and the scale the values were multiplied by.
#[derive(Debug, Clone, PartialEq)]
pub struct Plaintext {
    fingerprint: Fingerprint,
    level: usize,
    scale: f64,
    channels: Vec<Vec<u64>>,
}

impl Plaintext {
    pub(crate) fn new(
        fingerprint: Fingerprint,
        level: usize,
        scale: f64,
        channels: Vec<Vec<u64>>,
    ) -> Self {
        Self {
            fingerprint,
            level,
            scale,
            channels,
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

    pub fn channels(&self) -> &[Vec<u64>] {
        &self.channels
    }

    /// The message as an RNS polynomial over the primes of its level.
    ///
    /// Only meaningful for the approximate scheme, whose channels are residues
    /// modulo the chain primes.
    pub(crate) fn to_rns_poly(&self, params: &ParameterSet) -> RingResult<Option<RnsPoly>> {
        let Some(basis) = params.basis_at(self.level) else {
            return Ok(None);
        };
        RnsPoly::from_channels(self.channels.clone(), Arc::clone(basis), false).map(Some)
    }

    /// Serializes into the versioned little-endian layout.
    pub fn export(&self) -> Vec<u8> {
        serialize::write_object(
            ObjectKind::Plaintext,
            self.fingerprint,
            self.level,
            self.scale,
            &[&self.channels],
        )
    }

    /// Parses bytes produced by [`Plaintext::export`] against `params`.
    pub fn import(bytes: &[u8], params: &ParameterSet) -> Result<Self, FormatError> {
        let object = serialize::read_object(bytes, ObjectKind::Plaintext, params)?;
        let mut polys = object.polys.into_iter();
        let channels = polys.next().unwrap_or_default();
        Ok(Self::new(params.fingerprint(), object.level, object.scale, channels))
    }
}
