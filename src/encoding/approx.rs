use std::sync::Arc;

use num_complex::Complex64;

use super::{EncodeError, EncodeResult, special_fft::CanonicalEmbedding};
use crate::{
    Plaintext,
    params::{ParameterSet, SchemeKind},
    rings::RnsPoly,
};

/// Largest scaled coefficient magnitude accepted, `2^126`.
const MAX_SCALED_MAGNITUDE: f64 = (1u128 << 126) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Bits of `Q_level` that must stay free above the largest scaled
    /// coefficient.
    pub min_significant_bits: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            min_significant_bits: 20,
        }
    }
}

/// Fixed-point encoder for the approximate scheme.
///
/// Up to `N/2` complex slots are mapped through the inverse canonical
/// embedding, multiplied by the scale and rounded to integers.
#[derive(Debug, Clone)]
pub struct ApproxEncoder {
    params: Arc<ParameterSet>,
    config: EncoderConfig,
    embedding: CanonicalEmbedding,
}

impl ApproxEncoder {
    pub fn new(params: Arc<ParameterSet>) -> EncodeResult<Self> {
        Self::with_config(params, EncoderConfig::default())
    }

    pub fn with_config(params: Arc<ParameterSet>, config: EncoderConfig) -> EncodeResult<Self> {
        if params.scheme() != SchemeKind::ApproximateFixedPoint {
            return Err(EncodeError::UnsupportedInput {
                scheme: params.scheme(),
                input: "approximate slots",
            });
        }
        let embedding = CanonicalEmbedding::new(params.degree());
        Ok(Self {
            params,
            config,
            embedding,
        })
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn slot_count(&self) -> usize {
        self.embedding.slot_count()
    }

    /// Encodes real values at the top level. Missing slots are zero.
    pub fn encode(&self, values: &[f64], scale: f64) -> EncodeResult<Plaintext> {
        self.encode_at_level(values, scale, self.params.max_level())
    }

    pub fn encode_complex(&self, values: &[Complex64], scale: f64) -> EncodeResult<Plaintext> {
        self.encode_complex_at_level(values, scale, self.params.max_level())
    }

    pub fn encode_at_level(
        &self,
        values: &[f64],
        scale: f64,
        level: usize,
    ) -> EncodeResult<Plaintext> {
        let slots: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.encode_complex_at_level(&slots, scale, level)
    }

    pub fn encode_complex_at_level(
        &self,
        values: &[Complex64],
        scale: f64,
        level: usize,
    ) -> EncodeResult<Plaintext> {
        let max = self.slot_count();
        if values.len() > max {
            return Err(EncodeError::TooManySlots {
                got: values.len(),
                max,
            });
        }
        if !scale.is_finite() || scale < 1.0 {
            return Err(EncodeError::ScaleOutOfRange {
                scale,
                reason: "scale must be finite and at least 1".into(),
            });
        }
        let basis = self
            .params
            .basis_at(level)
            .ok_or(EncodeError::InvalidLevel {
                level,
                max_level: self.params.max_level(),
            })?;

        let scaled: Vec<f64> = self
            .embedding
            .slots_to_coeffs(values)
            .into_iter()
            .map(|c| (c * scale).round())
            .collect();
        let max_magnitude = scaled.iter().fold(0.0f64, |acc, c| acc.max(c.abs()));
        if scaled.iter().any(|c| !c.is_finite()) || max_magnitude >= MAX_SCALED_MAGNITUDE {
            return Err(EncodeError::ScaleOutOfRange {
                scale,
                reason: format!("scaled coefficient {max_magnitude:e} exceeds 2^126"),
            });
        }

        let wide: Vec<i128> = scaled.iter().map(|&c| c as i128).collect();
        let largest = wide.iter().map(|c| c.unsigned_abs()).max().unwrap_or(0);
        let used_bits = u128::BITS - (largest + 1).leading_zeros();
        let headroom = basis.modulus_bits() as i64 - used_bits as i64;
        if headroom < self.config.min_significant_bits as i64 {
            return Err(EncodeError::ScaleOutOfRange {
                scale,
                reason: format!(
                    "{headroom} bits of headroom at level {level}, need {}",
                    self.config.min_significant_bits
                ),
            });
        }

        let poly = RnsPoly::from_wide(&wide, Arc::clone(basis));
        Ok(Plaintext::new(
            self.params.fingerprint(),
            level,
            scale,
            poly.into_channels(),
        ))
    }

    /// Real parts of all `N/2` slots.
    pub fn decode(&self, plaintext: &Plaintext) -> EncodeResult<Vec<f64>> {
        Ok(self
            .decode_complex(plaintext)?
            .into_iter()
            .map(|z| z.re)
            .collect())
    }

    pub fn decode_complex(&self, plaintext: &Plaintext) -> EncodeResult<Vec<Complex64>> {
        self.params.check_fingerprint(plaintext.fingerprint())?;
        let poly = plaintext
            .to_rns_poly(&self.params)
            .map_err(|err| EncodeError::MalformedPlaintext {
                reason: err.to_string(),
            })?
            .ok_or(EncodeError::InvalidLevel {
                level: plaintext.level(),
                max_level: self.params.max_level(),
            })?;

        let crt = poly.basis().crt();
        let inv_scale = 1.0 / plaintext.scale();
        let mut scratch = Vec::with_capacity(poly.channels().len());
        let coeffs: Vec<f64> = (0..poly.degree())
            .map(|i| crt.centered_f64(&poly.compose_coefficient(i, &mut scratch)) * inv_scale)
            .collect();
        Ok(self.embedding.coeffs_to_slots(&coeffs))
    }
}
