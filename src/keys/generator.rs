use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use super::{PublicKey, SecretKey};
use crate::{
    errors::KeyMismatchError,
    math::{ClippedGaussian, sparse_ternary, ternary},
    params::ParameterSet,
    random::{EntropyError, RandomSource, seeded_sampler},
    rings::RnsPoly,
};

/// Standard deviation of the RLWE error distribution.
pub const DEFAULT_ERROR_STD_DEV: f64 = 3.2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyGenError {
    #[error("key generation needs entropy: {0}")]
    InsufficientEntropy(#[from] EntropyError),
    #[error("invalid key generation config: {reason}")]
    InvalidConfig { reason: String },
    #[error(transparent)]
    KeyMismatch(#[from] KeyMismatchError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGenConfig {
    pub error_std_dev: f64,
    /// `None` draws each secret coefficient uniformly from `{-1, 0, 1}`;
    /// `Some(h)` fixes exactly `h` non-zero coefficients.
    pub secret_hamming_weight: Option<usize>,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            error_std_dev: DEFAULT_ERROR_STD_DEV,
            secret_hamming_weight: None,
        }
    }
}

impl KeyGenConfig {
    fn validate(&self, degree: usize) -> Result<ClippedGaussian, KeyGenError> {
        match self.secret_hamming_weight {
            Some(weight) if weight == 0 || weight > degree => {
                return Err(KeyGenError::InvalidConfig {
                    reason: format!("hamming weight {weight} must be in [1, {degree}]"),
                });
            }
            _ => {}
        }
        ClippedGaussian::new(self.error_std_dev).ok_or_else(|| KeyGenError::InvalidConfig {
            reason: format!(
                "error_std_dev must be finite and positive, got {}",
                self.error_std_dev
            ),
        })
    }
}

/// Produces secret and public keys for one parameter set.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    params: Arc<ParameterSet>,
    config: KeyGenConfig,
    error: ClippedGaussian,
}

impl KeyGenerator {
    pub fn new(params: Arc<ParameterSet>) -> Self {
        let error = match ClippedGaussian::new(DEFAULT_ERROR_STD_DEV) {
            Some(error) => error,
            None => unreachable!("default standard deviation is positive"),
        };
        Self {
            params,
            config: KeyGenConfig::default(),
            error,
        }
    }

    pub fn with_config(params: Arc<ParameterSet>, config: KeyGenConfig) -> Result<Self, KeyGenError> {
        let error = config.validate(params.degree())?;
        Ok(Self {
            params,
            config,
            error,
        })
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn config(&self) -> &KeyGenConfig {
        &self.config
    }

    pub fn generate_secret_key<S: RandomSource + ?Sized>(
        &self,
        rng: &mut S,
    ) -> Result<SecretKey, KeyGenError> {
        let mut sampler = seeded_sampler(rng)?;
        let degree = self.params.degree();
        let coeffs = Zeroizing::new(match self.config.secret_hamming_weight {
            Some(weight) => sparse_ternary(degree, weight, &mut sampler),
            None => ternary(degree, &mut sampler),
        });
        let s = RnsPoly::from_signed(&coeffs, self.params.top_basis().clone());
        debug!(
            fingerprint = %self.params.fingerprint(),
            hamming_weight = ?self.config.secret_hamming_weight,
            "secret key generated"
        );
        Ok(SecretKey::new(self.params.clone(), s))
    }

    /// Samples `a` uniform and `e` from the clipped Gaussian, and returns
    /// `(-(a·s + e), a)`.
    pub fn generate_public_key<S: RandomSource + ?Sized>(
        &self,
        secret_key: &SecretKey,
        rng: &mut S,
    ) -> Result<PublicKey, KeyGenError> {
        self.params.check_fingerprint(secret_key.fingerprint())?;
        let mut sampler = seeded_sampler(rng)?;
        let basis = self.params.top_basis();

        let a = RnsPoly::sample_uniform(basis.clone(), &mut sampler);
        let e = RnsPoly::from_signed(
            &self.error.sample_vec(self.params.degree(), &mut sampler),
            basis.clone(),
        );

        let mut a_s = a.clone();
        a_s.to_ntt_domain();
        a_s *= secret_key.ntt();
        a_s.to_coeff_domain();
        a_s += &e;

        debug!(fingerprint = %self.params.fingerprint(), "public key generated");
        Ok(PublicKey::new(self.params.clone(), -a_s, a))
    }

    pub fn generate<S: RandomSource + ?Sized>(
        &self,
        rng: &mut S,
    ) -> Result<(SecretKey, PublicKey), KeyGenError> {
        let secret_key = self.generate_secret_key(rng)?;
        let public_key = self.generate_public_key(&secret_key, rng)?;
        Ok((secret_key, public_key))
    }
}
