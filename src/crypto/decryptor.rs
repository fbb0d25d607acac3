use tracing::warn;

use super::DecryptError;
use crate::{
    Ciphertext, Plaintext, errors::KeyMismatchError, keys::SecretKey, rings::RnsPoly,
};

/// Result of a decryption: the plaintext plus how much noise headroom was
/// left.
#[derive(Debug, Clone)]
pub struct Decryption {
    pub plaintext: Plaintext,
    /// Bits of headroom before the noise reaches the message.
    pub noise_budget: u32,
    /// Set when the budget is zero; the plaintext is still returned.
    pub warning: Option<DecryptError>,
}

impl Decryption {
    pub fn is_trustworthy(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_checked(self) -> Result<Plaintext, DecryptError> {
        match self.warning {
            Some(err) => Err(err),
            None => Ok(self.plaintext),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Decryptor<'a> {
    secret_key: &'a SecretKey,
}

impl<'a> Decryptor<'a> {
    pub fn new(secret_key: &'a SecretKey) -> Self {
        Self { secret_key }
    }

    /// Recovers the plaintext and reports the remaining noise budget.
    ///
    /// Integer schemes compute `m = round(t·x / Q_l) mod t` on the exact CRT
    /// composition of `x = c0 + c1·s`. The approximate scheme keeps `x` as
    /// residues; decoding divides by the scale.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Decryption, KeyMismatchError> {
        let x = self.phase(ciphertext)?;
        let params = self.secret_key.params();

        let (plaintext, noise_budget) = match params.plain_modulus() {
            Some(t) => {
                let crt = x.basis().crt();
                let mut scratch = Vec::with_capacity(x.channels().len());
                let mut noise_bits = 0;
                let coeffs = (0..x.degree())
                    .map(|i| {
                        let value = x.compose_coefficient(i, &mut scratch);
                        noise_bits = noise_bits.max(crt.centered_bits(&crt.scale_reduce(&value, t)));
                        crt.scale_and_round(&value, t)
                    })
                    .collect();
                let plaintext = Plaintext::new(
                    params.fingerprint(),
                    params.max_level(),
                    1.0,
                    vec![coeffs],
                );
                (plaintext, budget(crt.modulus_bits(), noise_bits))
            }
            None => {
                let noise_budget = budget(x.basis().modulus_bits(), max_centered_bits(&x));
                let plaintext = Plaintext::new(
                    params.fingerprint(),
                    ciphertext.level(),
                    ciphertext.scale(),
                    x.into_channels(),
                );
                (plaintext, noise_budget)
            }
        };

        let warning = if noise_budget == 0 {
            warn!(
                fingerprint = %params.fingerprint(),
                level = ciphertext.level(),
                "noise budget exhausted, decrypted value is unreliable"
            );
            Some(DecryptError::NoiseBudgetExhausted)
        } else {
            None
        };
        Ok(Decryption {
            plaintext,
            noise_budget,
            warning,
        })
    }

    /// `bits(Q_l) - bits(‖[t·x]_Q_l‖∞) - 1` for the integer schemes and
    /// `bits(Q_l) - bits(‖[x]_Q_l‖∞) - 1` for the approximate scheme.
    pub fn invariant_noise_budget(&self, ciphertext: &Ciphertext) -> Result<u32, KeyMismatchError> {
        let x = self.phase(ciphertext)?;
        let crt = x.basis().crt();
        let noise_bits = match self.secret_key.params().plain_modulus() {
            Some(t) => {
                let mut scratch = Vec::with_capacity(x.channels().len());
                (0..x.degree())
                    .map(|i| {
                        let value = x.compose_coefficient(i, &mut scratch);
                        crt.centered_bits(&crt.scale_reduce(&value, t))
                    })
                    .max()
                    .unwrap_or(0)
            }
            None => max_centered_bits(&x),
        };
        Ok(budget(crt.modulus_bits(), noise_bits))
    }

    /// `c0 + c1·s` over the ciphertext's level, in coefficient domain.
    fn phase(&self, ciphertext: &Ciphertext) -> Result<RnsPoly, KeyMismatchError> {
        self.secret_key
            .params()
            .check_fingerprint(ciphertext.fingerprint())?;
        let s = self.secret_key.ntt_over(ciphertext.c1().basis());

        let mut x = ciphertext.c1().clone();
        x.to_ntt_domain();
        x *= &*s;
        x.to_coeff_domain();
        x += ciphertext.c0();
        Ok(x)
    }
}

fn max_centered_bits(poly: &RnsPoly) -> u32 {
    let crt = poly.basis().crt();
    let mut scratch = Vec::with_capacity(poly.channels().len());
    (0..poly.degree())
        .map(|i| crt.centered_bits(&poly.compose_coefficient(i, &mut scratch)))
        .max()
        .unwrap_or(0)
}

fn budget(modulus_bits: u32, noise_bits: u32) -> u32 {
    modulus_bits.saturating_sub(noise_bits).saturating_sub(1)
}
