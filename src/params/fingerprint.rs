use std::fmt;

use sha2::{Digest, Sha256};

use super::SchemeKind;

const DOMAIN_TAG: &[u8] = b"lattice-he/params/v1";

/// SHA-256 digest identifying a parameter set.
///
/// Two parameter sets with equal fingerprints are interchangeable; every
/// object derived from one carries its fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub const LEN: usize = 32;

    pub(crate) fn compute(
        scheme: SchemeKind,
        degree: usize,
        coeff_modulus: &[u64],
        plain_modulus: Option<u64>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update([scheme.tag()]);
        hasher.update((degree as u64).to_le_bytes());
        hasher.update((coeff_modulus.len() as u64).to_le_bytes());
        for q in coeff_modulus {
            hasher.update(q.to_le_bytes());
        }
        match plain_modulus {
            Some(t) => {
                hasher.update([1u8]);
                hasher.update(t.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_changes_the_digest() {
        let base = Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[97, 193], Some(17));
        let variants = [
            Fingerprint::compute(SchemeKind::TimelineInteger, 16, &[97, 193], Some(17)),
            Fingerprint::compute(SchemeKind::BatchedInteger, 32, &[97, 193], Some(17)),
            Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[193, 97], Some(17)),
            Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[97], Some(17)),
            Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[97, 193], Some(97)),
            Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[97, 193], None),
        ];
        for other in variants {
            assert_ne!(base, other);
        }
        assert_eq!(
            base,
            Fingerprint::compute(SchemeKind::BatchedInteger, 16, &[97, 193], Some(17))
        );
    }

    #[test]
    fn display_is_lowercase_hex() {
        let fp = Fingerprint::from_bytes([0xab; 32]);
        assert_eq!(fp.to_string(), "ab".repeat(32));
        assert_eq!(format!("{fp:?}"), "Fingerprint(abababababababab)");
    }
}
