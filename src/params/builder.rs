use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use super::{
    DEFAULT_DEGREE, Fingerprint, MAX_DEGREE, MAX_MODULUS_BITS, MAX_TOTAL_COEFF_BITS, MIN_DEGREE,
    MIN_MODULUS_BITS, PLAIN_MODULUS_SEARCH_WINDOW, ParameterSet, PlainScaling, SchemeKind,
    errors::{ParameterError, ParameterResult},
};
use crate::{
    math::{crt::reduce_u512, is_prime, next_ntt_prime, prev_ntt_prime, utils::bit_length},
    rings::{NttTable, RnsBasis},
};

/// How the coefficient modulus chain is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoeffModulus {
    /// The named profile for the ring degree, see [`default_bit_sizes`].
    Default,
    /// Fresh NTT-friendly primes with the given bit sizes, in order.
    BitSizes(Vec<u32>),
    /// Caller-supplied primes, validated as-is.
    Explicit(Vec<u64>),
}

/// How the plaintext modulus of the integer schemes is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainModulus {
    Explicit(u64),
    /// Smallest batching-capable prime with exactly this many bits.
    BatchingBits(u32),
}

/// Bit sizes of the default chain for `degree` (128-bit classical security).
pub fn default_bit_sizes(degree: usize) -> Option<&'static [u32]> {
    match degree {
        1024 => Some(&[27]),
        2048 => Some(&[54]),
        4096 => Some(&[36, 36, 37]),
        8192 => Some(&[43, 43, 44, 44, 44]),
        16384 => Some(&[48, 48, 48, 49, 49, 49, 49, 49, 49]),
        _ => None,
    }
}

pub struct ParameterSetBuilder {
    scheme: SchemeKind,
    degree: Option<usize>,
    coeff_modulus: Option<CoeffModulus>,
    plain_modulus: Option<PlainModulus>,
}

impl ParameterSetBuilder {
    pub fn new(scheme: SchemeKind) -> Self {
        Self {
            scheme,
            degree: None,
            coeff_modulus: None,
            plain_modulus: None,
        }
    }

    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn coeff_modulus(mut self, coeff_modulus: CoeffModulus) -> Self {
        self.coeff_modulus = Some(coeff_modulus);
        self
    }

    pub fn plain_modulus(mut self, plain_modulus: PlainModulus) -> Self {
        self.plain_modulus = Some(plain_modulus);
        self
    }

    pub fn build(self) -> ParameterResult<Arc<ParameterSet>> {
        let degree = self.degree.unwrap_or(DEFAULT_DEGREE);
        if !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) || !degree.is_power_of_two() {
            return Err(ParameterError::InvalidDegree {
                degree,
                min: MIN_DEGREE,
                max: MAX_DEGREE,
            });
        }

        let coeff_modulus = match self.coeff_modulus.unwrap_or(CoeffModulus::Default) {
            CoeffModulus::Default => {
                let bit_sizes = default_bit_sizes(degree)
                    .ok_or(ParameterError::NoDefaultProfile { degree })?;
                generate_chain(bit_sizes, degree)?
            }
            CoeffModulus::BitSizes(bit_sizes) => generate_chain(&bit_sizes, degree)?,
            CoeffModulus::Explicit(primes) => primes,
        };
        let total_bits = validate_chain(&coeff_modulus, degree)?;

        let plain_modulus = match (self.scheme.is_integer(), self.plain_modulus) {
            (true, None) => {
                return Err(ParameterError::MissingPlainModulus {
                    scheme: self.scheme,
                });
            }
            (false, Some(_)) => {
                return Err(ParameterError::UnexpectedPlainModulus {
                    scheme: self.scheme,
                });
            }
            (false, None) => None,
            (true, Some(PlainModulus::Explicit(t))) => Some(t),
            (true, Some(PlainModulus::BatchingBits(bits))) => {
                Some(find_batching_prime(bits, degree)?)
            }
        };
        if let Some(t) = plain_modulus {
            validate_plain_modulus(t, degree, &coeff_modulus)?;
        }

        let two_n = 2 * degree as u64;
        let tables = coeff_modulus
            .iter()
            .map(|&q| {
                NttTable::new(degree, q)
                    .map(Arc::new)
                    .map_err(|_| ParameterError::NotNttFriendly { modulus: q, two_n })
            })
            .collect::<ParameterResult<Vec<_>>>()?;
        let level_bases = (1..=tables.len())
            .map(|count| {
                RnsBasis::from_tables(tables[..count].to_vec())
                    .map(Arc::new)
                    .map_err(|_| ParameterError::ChainTooLarge {
                        bits: total_bits,
                        max: MAX_TOTAL_COEFF_BITS,
                    })
            })
            .collect::<ParameterResult<Vec<_>>>()?;

        let (plain_table, plain_scaling) = match plain_modulus {
            Some(t) => {
                let table = NttTable::new(degree, t).map_err(|err| {
                    ParameterError::InvalidPlainModulus {
                        modulus: t,
                        reason: err.to_string(),
                    }
                })?;
                (Some(table), plain_scaling_for(&level_bases, t)?)
            }
            None => (None, Vec::new()),
        };

        let fingerprint = Fingerprint::compute(self.scheme, degree, &coeff_modulus, plain_modulus);
        debug!(
            scheme = %self.scheme,
            degree,
            chain_bits = total_bits,
            levels = coeff_modulus.len(),
            plain_modulus = ?plain_modulus,
            fingerprint = %fingerprint,
            "parameter set ready"
        );

        Ok(Arc::new(ParameterSet {
            scheme: self.scheme,
            degree,
            coeff_modulus,
            plain_modulus,
            fingerprint,
            level_bases,
            plain_table,
            plain_scaling,
        }))
    }
}

fn check_bits(bits: u32) -> ParameterResult<()> {
    if (MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits) {
        Ok(())
    } else {
        Err(ParameterError::InvalidModulusBits {
            bits,
            min: MIN_MODULUS_BITS,
            max: MAX_MODULUS_BITS,
        })
    }
}

/// Walks down from `2^bits` in steps of `2N`, handing out distinct primes per
/// bit size in request order.
fn generate_chain(bit_sizes: &[u32], degree: usize) -> ParameterResult<Vec<u64>> {
    if bit_sizes.is_empty() {
        return Err(ParameterError::EmptyModulusChain);
    }
    for &bits in bit_sizes {
        check_bits(bits)?;
    }
    let total: u32 = bit_sizes.iter().sum();
    if total > MAX_TOTAL_COEFF_BITS {
        return Err(ParameterError::ChainTooLarge {
            bits: total,
            max: MAX_TOTAL_COEFF_BITS,
        });
    }

    let mut cursors: HashMap<u32, u64> = HashMap::new();
    let mut chain = Vec::with_capacity(bit_sizes.len());
    for &bits in bit_sizes {
        let cursor = cursors.entry(bits).or_insert(1u64 << bits);
        let prime = prev_ntt_prime(*cursor, degree as u64)
            .filter(|&p| bit_length(p) == bits)
            .ok_or(ParameterError::NoSuitableCoeffModulus { bits, degree })?;
        *cursor = prime;
        chain.push(prime);
    }
    Ok(chain)
}

/// Returns the total bit length of the chain.
fn validate_chain(chain: &[u64], degree: usize) -> ParameterResult<u32> {
    if chain.is_empty() {
        return Err(ParameterError::EmptyModulusChain);
    }
    let two_n = 2 * degree as u64;
    let mut total = 0u32;
    for (i, &q) in chain.iter().enumerate() {
        check_bits(bit_length(q))?;
        if !is_prime(q) {
            return Err(ParameterError::NonPrimeModulus { modulus: q });
        }
        if q % two_n != 1 {
            return Err(ParameterError::NotNttFriendly { modulus: q, two_n });
        }
        if chain[..i].contains(&q) {
            return Err(ParameterError::DuplicateModulus { modulus: q });
        }
        total += bit_length(q);
    }
    if total > MAX_TOTAL_COEFF_BITS {
        return Err(ParameterError::ChainTooLarge {
            bits: total,
            max: MAX_TOTAL_COEFF_BITS,
        });
    }
    Ok(total)
}

fn find_batching_prime(bits: u32, degree: usize) -> ParameterResult<u64> {
    check_bits(bits)?;
    next_ntt_prime(
        1u64 << (bits - 1),
        degree as u64,
        1u64 << bits,
        PLAIN_MODULUS_SEARCH_WINDOW,
    )
    .ok_or(ParameterError::NoSuitablePlaintextModulus { bits, degree })
}

fn validate_plain_modulus(t: u64, degree: usize, chain: &[u64]) -> ParameterResult<()> {
    let invalid = |reason: String| ParameterError::InvalidPlainModulus { modulus: t, reason };
    if !is_prime(t) {
        return Err(invalid("not prime".into()));
    }
    let two_n = 2 * degree as u64;
    if t % two_n != 1 {
        return Err(invalid(format!(
            "not congruent to 1 mod {two_n}, batching is unavailable"
        )));
    }
    if let Some(&q) = chain.iter().find(|&&q| q <= t) {
        return Err(invalid(format!(
            "must be smaller than every coefficient modulus, found {q}"
        )));
    }
    Ok(())
}

fn plain_scaling_for(bases: &[Arc<RnsBasis>], t: u64) -> ParameterResult<Vec<PlainScaling>> {
    bases
        .iter()
        .map(|basis| {
            let (delta, modulus_mod_t) = basis.crt().divide_modulus(t).ok_or_else(|| {
                ParameterError::InvalidPlainModulus {
                    modulus: t,
                    reason: "zero".into(),
                }
            })?;
            let delta_residues = basis
                .moduli()
                .iter()
                .map(|&q| reduce_u512(&delta, q))
                .collect();
            Ok(PlainScaling {
                delta_residues,
                modulus_mod_t,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn integer(scheme: SchemeKind, degree: usize) -> ParameterSetBuilder {
        ParameterSet::builder(scheme)
            .degree(degree)
            .plain_modulus(PlainModulus::Explicit(786_433))
    }

    #[test]
    fn default_profile_for_4096_matches_reference_primes() {
        let params = integer(SchemeKind::BatchedInteger, 4096).build().unwrap();
        assert_eq!(
            params.coeff_modulus(),
            &[68_719_403_009, 68_719_230_977, 137_438_822_401]
        );
        assert_eq!(params.max_level(), 2);
        assert_eq!(params.total_coeff_modulus_bits(), 109);
        assert_eq!(params.coeff_modulus_bits(0), Some(36));
        assert_eq!(params.coeff_modulus_bits(3), None);
        assert_eq!(params.slot_count(), 4096);
        assert!(params.plain_table().is_some());
    }

    #[test]
    fn bit_sizes_yield_distinct_primes_of_requested_width() {
        let params = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(1024)
            .coeff_modulus(CoeffModulus::BitSizes(vec![40, 30, 30, 40]))
            .build()
            .unwrap();
        let chain = params.coeff_modulus();
        assert_eq!(
            chain.iter().map(|&q| bit_length(q)).collect::<Vec<_>>(),
            vec![40, 30, 30, 40]
        );
        assert_ne!(chain[1], chain[2]);
        assert_ne!(chain[0], chain[3]);
        assert!(chain.iter().all(|&q| q % 2048 == 1));
        assert_eq!(params.slot_count(), 512);
        assert!(params.plain_table().is_none());
    }

    #[test]
    fn degree_validation() {
        for degree in [0, 1, 3, 1000, 32_768] {
            let err = integer(SchemeKind::BatchedInteger, degree).build().unwrap_err();
            assert!(matches!(err, ParameterError::InvalidDegree { .. }), "{degree}");
        }
        let err = integer(SchemeKind::BatchedInteger, 512).build().unwrap_err();
        assert_eq!(err, ParameterError::NoDefaultProfile { degree: 512 });
    }

    #[test]
    fn explicit_chain_validation() {
        let build = |chain: Vec<u64>| {
            ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
                .degree(16)
                .coeff_modulus(CoeffModulus::Explicit(chain))
                .build()
        };
        assert_eq!(build(vec![]).unwrap_err(), ParameterError::EmptyModulusChain);
        assert_eq!(
            build(vec![97, 161]).unwrap_err(),
            ParameterError::NonPrimeModulus { modulus: 161 }
        );
        assert_eq!(
            build(vec![97, 101]).unwrap_err(),
            ParameterError::NotNttFriendly {
                modulus: 101,
                two_n: 32
            }
        );
        assert_eq!(
            build(vec![97, 193, 97]).unwrap_err(),
            ParameterError::DuplicateModulus { modulus: 97 }
        );
        assert!(matches!(
            build(vec![1 << 61]).unwrap_err(),
            ParameterError::InvalidModulusBits { bits: 62, .. }
        ));
        assert!(build(vec![97, 193]).is_ok());
    }

    #[test]
    fn oversized_chains_are_rejected() {
        let err = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(16384)
            .coeff_modulus(CoeffModulus::BitSizes(vec![60; 8]))
            .build()
            .unwrap_err();
        assert_eq!(err, ParameterError::ChainTooLarge { bits: 480, max: 440 });

        let err = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(16384)
            .coeff_modulus(CoeffModulus::BitSizes(vec![61]))
            .build()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidModulusBits { bits: 61, .. }));
    }

    #[test]
    fn prime_search_can_run_dry() {
        // No 14-bit prime is ≡ 1 mod 8192.
        let err = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(4096)
            .coeff_modulus(CoeffModulus::BitSizes(vec![14, 14, 14]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::NoSuitableCoeffModulus {
                bits: 14,
                degree: 4096
            }
        );
    }

    #[test]
    fn plain_modulus_policy() {
        let err = ParameterSet::builder(SchemeKind::TimelineInteger)
            .degree(4096)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::MissingPlainModulus {
                scheme: SchemeKind::TimelineInteger
            }
        );

        let err = ParameterSet::builder(SchemeKind::ApproximateFixedPoint)
            .degree(4096)
            .plain_modulus(PlainModulus::Explicit(786_433))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::UnexpectedPlainModulus {
                scheme: SchemeKind::ApproximateFixedPoint
            }
        );

        for t in [786_432, 786_431, 12_289] {
            let err = ParameterSet::builder(SchemeKind::BatchedInteger)
                .degree(4096)
                .plain_modulus(PlainModulus::Explicit(t))
                .build()
                .unwrap_err();
            assert!(
                matches!(err, ParameterError::InvalidPlainModulus { modulus, .. } if modulus == t),
                "{t}"
            );
        }

        let err = ParameterSet::builder(SchemeKind::BatchedInteger)
            .degree(16)
            .coeff_modulus(CoeffModulus::Explicit(vec![97]))
            .plain_modulus(PlainModulus::Explicit(193))
            .build()
            .unwrap_err();
        assert!(matches!(err, ParameterError::InvalidPlainModulus { modulus: 193, .. }));
    }

    #[test]
    fn batching_bits_picks_smallest_prime() {
        let params = ParameterSet::builder(SchemeKind::BatchedInteger)
            .degree(4096)
            .plain_modulus(PlainModulus::BatchingBits(20))
            .build()
            .unwrap();
        assert_eq!(params.plain_modulus(), Some(557_057));

        let err = ParameterSet::builder(SchemeKind::BatchedInteger)
            .degree(4096)
            .plain_modulus(PlainModulus::BatchingBits(12))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::NoSuitablePlaintextModulus {
                bits: 12,
                degree: 4096
            }
        );
    }

    #[test]
    fn plain_scaling_matches_floor_division() {
        let params = ParameterSet::builder(SchemeKind::TimelineInteger)
            .degree(4)
            .coeff_modulus(CoeffModulus::Explicit(vec![97, 193]))
            .plain_modulus(PlainModulus::Explicit(17))
            .build()
            .unwrap();
        let top = params.plain_scaling(1).unwrap();
        let q = 97u64 * 193;
        assert_eq!(top.modulus_mod_t, q % 17);
        assert_eq!(top.delta_residues, vec![(q / 17) % 97, (q / 17) % 193]);
        let bottom = params.plain_scaling(0).unwrap();
        assert_eq!(bottom.delta_residues, vec![97 / 17]);
        assert_eq!(bottom.modulus_mod_t, 97 % 17);
    }

    #[test]
    #[traced_test]
    fn build_logs_parameter_summary() {
        let params = integer(SchemeKind::TimelineInteger, 4096).build().unwrap();
        assert!(logs_contain("parameter set ready"));
        assert!(logs_contain(&params.fingerprint().to_string()));
    }
}
