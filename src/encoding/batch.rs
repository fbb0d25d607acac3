use std::sync::Arc;

use super::{EncodeError, EncodeResult};
use crate::{
    Plaintext,
    params::ParameterSet,
    rings::{NttTable, RingArithmetic},
};

/// Packs `N` integers modulo `t` into one plaintext polynomial.
///
/// Slot `k` is the evaluation of the plaintext at `ψ^(2k+1)` where `ψ` is a
/// primitive `2N`-th root of unity modulo `t`, so slot-wise products of
/// vectors are negacyclic products of their encodings.
#[derive(Debug, Clone)]
pub struct BatchEncoder {
    params: Arc<ParameterSet>,
}

impl BatchEncoder {
    /// Fails with [`EncodeError::UnsupportedInput`] for the approximate scheme.
    pub fn new(params: Arc<ParameterSet>) -> EncodeResult<Self> {
        if params.plain_table().is_none() {
            return Err(EncodeError::UnsupportedInput {
                scheme: params.scheme(),
                input: "integer slots",
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn slot_count(&self) -> usize {
        self.params.degree()
    }

    pub fn plain_modulus(&self) -> u64 {
        self.table().modulus()
    }

    fn table(&self) -> &NttTable {
        match self.params.plain_table() {
            Some(table) => table,
            None => unreachable!("checked in BatchEncoder::new"),
        }
    }

    /// Encodes exactly `N` values; each is reduced modulo `t` first.
    pub fn encode(&self, values: &[u64]) -> EncodeResult<Plaintext> {
        self.check_len(values.len())?;
        let t = self.plain_modulus();
        let mut slots: Vec<u64> = values.iter().map(|&v| v % t).collect();
        self.table().inverse_in_place(&mut slots);
        Ok(self.wrap(slots))
    }

    /// Encodes signed values, mapping negatives to `t - |v|`.
    pub fn encode_signed(&self, values: &[i64]) -> EncodeResult<Plaintext> {
        self.check_len(values.len())?;
        let t = self.plain_modulus() as i128;
        let mut slots: Vec<u64> = values
            .iter()
            .map(|&v| (v as i128).rem_euclid(t) as u64)
            .collect();
        self.table().inverse_in_place(&mut slots);
        Ok(self.wrap(slots))
    }

    /// Returns the `N` slot values in `[0, t)`.
    pub fn decode(&self, plaintext: &Plaintext) -> EncodeResult<Vec<u64>> {
        let coeffs = self.check_plaintext(plaintext)?;
        Ok(self.table().forward_transform(coeffs))
    }

    /// Returns the `N` slot values lifted into `(-t/2, t/2]`.
    pub fn decode_signed(&self, plaintext: &Plaintext) -> EncodeResult<Vec<i64>> {
        let t = self.plain_modulus();
        let half = t / 2;
        Ok(self
            .decode(plaintext)?
            .into_iter()
            .map(|v| if v > half { v as i64 - t as i64 } else { v as i64 })
            .collect())
    }

    fn check_len(&self, actual: usize) -> EncodeResult<()> {
        let expected = self.slot_count();
        if actual != expected {
            return Err(EncodeError::SlotCountMismatch { expected, actual });
        }
        Ok(())
    }

    fn check_plaintext<'p>(&self, plaintext: &'p Plaintext) -> EncodeResult<&'p [u64]> {
        self.params.check_fingerprint(plaintext.fingerprint())?;
        match plaintext.channels() {
            [coeffs] if coeffs.len() == self.slot_count() => Ok(coeffs.as_slice()),
            channels => Err(EncodeError::MalformedPlaintext {
                reason: format!(
                    "expected one channel of {} coefficients, found {} channels",
                    self.slot_count(),
                    channels.len()
                ),
            }),
        }
    }

    fn wrap(&self, coeffs: Vec<u64>) -> Plaintext {
        Plaintext::new(
            self.params.fingerprint(),
            self.params.max_level(),
            1.0,
            vec![coeffs],
        )
    }
}
