//! Canonical embedding of `R[X]/(X^N + 1)` through a twisted FFT.
//!
//! Slot `j` is the evaluation at `ψ^(5^j mod 2N)` with `ψ = e^{iπ/N}`; its
//! conjugate partner lives at `ψ^(-5^j)`. Because `ψ² = e^{2πi/N}`, evaluating
//! at all odd powers is one length-`N` FFT of the twisted coefficients
//! `a_j · ψ^j`, and evaluation point `ψ^(2k+1)` lands at FFT index `k`.

use std::{f64::consts::PI, fmt, sync::Arc};

use rustfft::{Fft, FftPlanner, num_complex::Complex64};

use crate::math::utils::mod_pow;

#[derive(Clone)]
pub struct CanonicalEmbedding {
    degree: usize,
    /// FFT index holding slot `j`.
    slot_indices: Vec<usize>,
    /// FFT index holding the conjugate of slot `j`.
    conjugate_indices: Vec<usize>,
    /// `ψ^j` for `j < N`.
    twist: Vec<Complex64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl CanonicalEmbedding {
    /// `degree` must be a power of two `>= 2`.
    pub fn new(degree: usize) -> Self {
        debug_assert!(degree >= 2 && degree.is_power_of_two());
        let two_n = 2 * degree as u64;
        let (slot_indices, conjugate_indices) = (0..degree / 2)
            .map(|j| {
                let exponent = mod_pow(5, j as u64, two_n);
                (
                    ((exponent - 1) / 2) as usize,
                    ((two_n - exponent - 1) / 2) as usize,
                )
            })
            .unzip();
        let twist = (0..degree)
            .map(|j| Complex64::from_polar(1.0, PI * j as f64 / degree as f64))
            .collect();

        let mut planner = FftPlanner::new();
        Self {
            degree,
            slot_indices,
            conjugate_indices,
            twist,
            forward: planner.plan_fft_forward(degree),
            inverse: planner.plan_fft_inverse(degree),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.degree / 2
    }

    /// Real coefficients whose embedding agrees with `slots` (missing slots
    /// read as zero).
    pub fn slots_to_coeffs(&self, slots: &[Complex64]) -> Vec<f64> {
        debug_assert!(slots.len() <= self.slot_count());
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.degree];
        for (j, &value) in slots.iter().enumerate() {
            buffer[self.slot_indices[j]] = value;
            buffer[self.conjugate_indices[j]] = value.conj();
        }
        self.forward.process(&mut buffer);
        let inv_n = 1.0 / self.degree as f64;
        buffer
            .iter()
            .zip(&self.twist)
            .map(|(b, psi)| (*b * psi.conj()).re * inv_n)
            .collect()
    }

    /// Evaluates the real polynomial with `coeffs` at every slot point.
    pub fn coeffs_to_slots(&self, coeffs: &[f64]) -> Vec<Complex64> {
        debug_assert_eq!(coeffs.len(), self.degree);
        let mut buffer: Vec<Complex64> = coeffs
            .iter()
            .zip(&self.twist)
            .map(|(&a, psi)| *psi * a)
            .collect();
        self.inverse.process(&mut buffer);
        self.slot_indices.iter().map(|&k| buffer[k]).collect()
    }
}

impl fmt::Debug for CanonicalEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalEmbedding")
            .field("degree", &self.degree)
            .finish_non_exhaustive()
    }
}
