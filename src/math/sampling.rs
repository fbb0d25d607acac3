use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal, uniform::Uniform};

/// Samples `degree` residues uniformly from `[0, modulus)`.
///
/// # Panics
///
/// Panics if `modulus == 0`.
pub fn uniform_residues<R: Rng + ?Sized>(modulus: u64, degree: usize, rng: &mut R) -> Vec<u64> {
    let distribution = Uniform::new(0, modulus)
        .unwrap_or_else(|_| panic!("uniform_residues: empty range [0, {modulus})"));
    (0..degree).map(|_| distribution.sample(rng)).collect()
}

/// Samples a dense ternary vector, each coefficient uniform over `{-1, 0, 1}`.
pub fn ternary<R: Rng + ?Sized>(degree: usize, rng: &mut R) -> Vec<i64> {
    (0..degree).map(|_| rng.random_range(-1i64..=1)).collect()
}

/// Samples a ternary vector with exactly `hamming_weight` non-zero entries.
///
/// # Panics
///
/// Panics if `hamming_weight > degree`.
pub fn sparse_ternary<R: Rng + ?Sized>(
    degree: usize,
    hamming_weight: usize,
    rng: &mut R,
) -> Vec<i64> {
    assert!(
        hamming_weight <= degree,
        "sparse_ternary: hamming_weight must be <= degree"
    );
    let mut out = vec![0i64; degree];
    let mut indices: Vec<usize> = (0..degree).collect();
    indices.shuffle(rng);
    for &idx in indices.iter().take(hamming_weight) {
        out[idx] = if rng.random_bool(0.5) { 1 } else { -1 };
    }
    out
}

/// Rounded normal distribution with tails cut at `6σ`.
///
/// Out-of-range draws are resampled rather than clamped, so the support is
/// exactly `[-bound, bound]`.
#[derive(Debug, Clone, Copy)]
pub struct ClippedGaussian {
    normal: Normal<f64>,
    bound: f64,
}

impl ClippedGaussian {
    pub const TAIL_CUT: f64 = 6.0;

    /// `None` unless `std_dev` is finite and positive.
    pub fn new(std_dev: f64) -> Option<Self> {
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return None;
        }
        let normal = Normal::new(0.0, std_dev).ok()?;
        Some(Self {
            normal,
            bound: (Self::TAIL_CUT * std_dev).round(),
        })
    }

    pub fn bound(&self) -> i64 {
        self.bound as i64
    }

    pub fn sample_vec<R: Rng + ?Sized>(&self, degree: usize, rng: &mut R) -> Vec<i64> {
        (0..degree).map(|_| self.sample(rng)).collect()
    }
}

impl Distribution<i64> for ClippedGaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        loop {
            let value = self.normal.sample(rng).round();
            if value.abs() <= self.bound {
                return value as i64;
            }
        }
    }
}
