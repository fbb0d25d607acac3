use std::sync::Arc;

use zeroize::Zeroizing;

use super::EncryptError;
use crate::{
    Ciphertext, Plaintext,
    keys::{DEFAULT_ERROR_STD_DEV, PublicKey, SecretKey},
    math::{ClippedGaussian, add_mod, mul_mod, ternary},
    params::ParameterSet,
    random::{RandomSource, seeded_sampler},
    rings::{RnsBasis, RnsPoly},
};

#[derive(Debug, Clone, Copy)]
enum EncryptionKey<'a> {
    Public(&'a PublicKey),
    Secret(&'a SecretKey),
}

/// Encrypts plaintexts under a public key, or under the secret key directly.
#[derive(Debug, Clone)]
pub struct Encryptor<'a> {
    params: Arc<ParameterSet>,
    key: EncryptionKey<'a>,
    error: ClippedGaussian,
}

impl<'a> Encryptor<'a> {
    pub fn asymmetric(public_key: &'a PublicKey) -> Self {
        Self::with_key(public_key.params().clone(), EncryptionKey::Public(public_key))
    }

    pub fn symmetric(secret_key: &'a SecretKey) -> Self {
        Self::with_key(secret_key.params().clone(), EncryptionKey::Secret(secret_key))
    }

    fn with_key(params: Arc<ParameterSet>, key: EncryptionKey<'a>) -> Self {
        let error = match ClippedGaussian::new(DEFAULT_ERROR_STD_DEV) {
            Some(error) => error,
            None => unreachable!("default standard deviation is positive"),
        };
        Self { params, key, error }
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    /// Encrypts `plaintext` at its own level.
    ///
    /// Public key: `(p0·u + e0 + Δ·m, p1·u + e1)` with ternary `u`.
    /// Secret key: `(-(a·s + e) + Δ·m, a)` with uniform `a`.
    pub fn encrypt<S: RandomSource + ?Sized>(
        &self,
        plaintext: &Plaintext,
        rng: &mut S,
    ) -> Result<Ciphertext, EncryptError> {
        self.params.check_fingerprint(plaintext.fingerprint())?;
        let level = plaintext.level();
        let basis = self
            .params
            .basis_at(level)
            .ok_or_else(|| EncryptError::InvalidPlaintext {
                reason: format!(
                    "level {level} exceeds max level {}",
                    self.params.max_level()
                ),
            })?;
        let message = self.scaled_message(plaintext, basis)?;
        let mut sampler = seeded_sampler(rng)?;

        let (mut c0, c1) = match self.key {
            EncryptionKey::Public(public_key) => {
                let (p0, p1) = public_key.ntt_at_level(level).ok_or_else(|| {
                    EncryptError::InvalidPlaintext {
                        reason: format!("public key has no level {level}"),
                    }
                })?;
                let u_coeffs = Zeroizing::new(ternary(self.params.degree(), &mut sampler));
                let mut u = Zeroizing::new(RnsPoly::from_signed(&u_coeffs, Arc::clone(basis)));
                u.to_ntt_domain();

                let mut c0 = p0;
                c0 *= &*u;
                c0.to_coeff_domain();
                c0 += &self.gaussian(basis, &mut sampler);

                let mut c1 = p1;
                c1 *= &*u;
                c1.to_coeff_domain();
                c1 += &self.gaussian(basis, &mut sampler);
                (c0, c1)
            }
            EncryptionKey::Secret(secret_key) => {
                let s = secret_key.ntt_at_level(level).ok_or_else(|| {
                    EncryptError::InvalidPlaintext {
                        reason: format!("secret key has no level {level}"),
                    }
                })?;
                let a = RnsPoly::sample_uniform(Arc::clone(basis), &mut sampler);
                let mut a_s = a.clone();
                a_s.to_ntt_domain();
                a_s *= &*s;
                a_s.to_coeff_domain();
                a_s += &self.gaussian(basis, &mut sampler);
                (-a_s, a)
            }
        };
        c0 += &message;

        Ok(Ciphertext::new(
            self.params.fingerprint(),
            level,
            plaintext.scale(),
            c0,
            c1,
        ))
    }

    fn gaussian<R: rand::Rng + ?Sized>(&self, basis: &Arc<RnsBasis>, rng: &mut R) -> RnsPoly {
        RnsPoly::from_signed(
            &self.error.sample_vec(self.params.degree(), rng),
            Arc::clone(basis),
        )
    }

    /// `Δ·m` over `basis`, in coefficient domain.
    ///
    /// Integer schemes use `round(Q_l·m / t) = Δ·m + round((Q_l mod t)·m / t)`
    /// with `m ∈ [0, t)`; the approximate plaintext is already scaled.
    fn scaled_message(
        &self,
        plaintext: &Plaintext,
        basis: &Arc<RnsBasis>,
    ) -> Result<RnsPoly, EncryptError> {
        let level = plaintext.level();
        let Some(t) = self.params.plain_modulus() else {
            return plaintext
                .to_rns_poly(&self.params)
                .map_err(|err| EncryptError::InvalidPlaintext {
                    reason: err.to_string(),
                })?
                .ok_or_else(|| EncryptError::InvalidPlaintext {
                    reason: format!("no basis for level {level}"),
                });
        };

        let coeffs = match plaintext.channels() {
            [coeffs] if coeffs.len() == self.params.degree() => coeffs,
            channels => {
                return Err(EncryptError::InvalidPlaintext {
                    reason: format!(
                        "expected one channel of {} coefficients, found {}",
                        self.params.degree(),
                        channels.len()
                    ),
                });
            }
        };
        if let Some(&value) = coeffs.iter().find(|&&m| m >= t) {
            return Err(EncryptError::InvalidPlaintext {
                reason: format!("coefficient {value} not reduced modulo {t}"),
            });
        }
        let scaling = self
            .params
            .plain_scaling(level)
            .ok_or_else(|| EncryptError::InvalidPlaintext {
                reason: format!("no plaintext scaling for level {level}"),
            })?;

        let corrections: Vec<u64> = coeffs
            .iter()
            .map(|&m| {
                let numerator = scaling.modulus_mod_t as u128 * m as u128 + (t / 2) as u128;
                (numerator / t as u128) as u64
            })
            .collect();
        let channels = basis
            .moduli()
            .iter()
            .zip(&scaling.delta_residues)
            .map(|(&q, &delta)| {
                coeffs
                    .iter()
                    .zip(&corrections)
                    .map(|(&m, &correction)| {
                        add_mod(mul_mod(delta, m % q, q), correction % q, q)
                    })
                    .collect()
            })
            .collect();
        RnsPoly::from_channels(channels, Arc::clone(basis), false).map_err(|err| {
            EncryptError::InvalidPlaintext {
                reason: err.to_string(),
            }
        })
    }
}
