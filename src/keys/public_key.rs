use std::{fmt, sync::Arc};

use crate::{
    params::{Fingerprint, ParameterSet},
    rings::RnsPoly,
};

/// RLWE public key `(p0, p1) = (-(a·s + e), a)` at the top level.
#[derive(Clone)]
pub struct PublicKey {
    params: Arc<ParameterSet>,
    /// NTT domain.
    p0: RnsPoly,
    /// NTT domain.
    p1: RnsPoly,
}

impl PublicKey {
    pub(crate) fn new(params: Arc<ParameterSet>, mut p0: RnsPoly, mut p1: RnsPoly) -> Self {
        p0.to_ntt_domain();
        p1.to_ntt_domain();
        Self { params, p0, p1 }
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.params.fingerprint()
    }

    /// Both components restricted to the primes of `level`, in NTT domain.
    pub(crate) fn ntt_at_level(&self, level: usize) -> Option<(RnsPoly, RnsPoly)> {
        let basis = self.params.basis_at(level)?;
        Some((
            self.p0.restrict_to(basis.clone()),
            self.p1.restrict_to(basis.clone()),
        ))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("fingerprint", &self.params.fingerprint())
            .finish_non_exhaustive()
    }
}
