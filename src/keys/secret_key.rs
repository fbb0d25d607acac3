//! Secret key: a small ternary polynomial `s(X)`, held as RNS residues over
//! the full modulus chain.

use std::{fmt, sync::Arc};

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    params::{Fingerprint, ParameterSet},
    rings::{RnsBasis, RnsPoly},
};

/// Owns the only copy of `s`. Not `Clone`; residues are wiped on drop.
pub struct SecretKey {
    params: Arc<ParameterSet>,
    /// NTT domain, top-level basis.
    s: RnsPoly,
}

impl SecretKey {
    pub(crate) fn new(params: Arc<ParameterSet>, mut s: RnsPoly) -> Self {
        s.to_ntt_domain();
        Self { params, s }
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.params.fingerprint()
    }

    /// `s` over the full chain, in NTT domain.
    pub(crate) fn ntt(&self) -> &RnsPoly {
        &self.s
    }

    /// `s` restricted to the prefix `basis`, in NTT domain. The copy is
    /// wiped when dropped.
    pub(crate) fn ntt_over(&self, basis: &Arc<RnsBasis>) -> Zeroizing<RnsPoly> {
        Zeroizing::new(self.s.restrict_to(Arc::clone(basis)))
    }

    /// `s` restricted to the primes of `level`, in NTT domain.
    pub(crate) fn ntt_at_level(&self, level: usize) -> Option<Zeroizing<RnsPoly>> {
        let basis = self.params.basis_at(level)?;
        Some(self.ntt_over(basis))
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.s.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("fingerprint", &self.params.fingerprint())
            .field("s", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        keys::KeyGenerator,
        params::{CoeffModulus, SchemeKind},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn assert_wiped<T: ZeroizeOnDrop>(_: &T) {}

    fn secret_key() -> SecretKey {
        let params = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(16)
            .coeff_modulus(CoeffModulus::BitSizes(vec![30, 30, 30]))
            .build()
            .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        KeyGenerator::new(params)
            .generate_secret_key(&mut rng)
            .unwrap()
    }

    #[test]
    fn restricted_copies_are_wiped_on_drop() {
        let sk = secret_key();
        assert_wiped(&sk);

        let s = sk.ntt_at_level(1).unwrap();
        assert_wiped(&s);
        assert!(s.is_ntt_domain());
        assert_eq!(s.channels(), &sk.ntt().channels()[..2]);

        let bottom = sk.params().basis_at(0).unwrap();
        let s = sk.ntt_over(bottom);
        assert_wiped(&s);
        assert_eq!(s.channels(), &sk.ntt().channels()[..1]);

        assert!(sk.ntt_at_level(3).is_none());
    }

    #[test]
    fn debug_output_is_redacted() {
        let sk = secret_key();
        let rendered = format!("{sk:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains(&sk.fingerprint().to_hex()[..16]));
    }
}
