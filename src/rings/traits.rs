use crate::math::utils::{add_mod, mul_mod};

/// Arithmetic in `Z_q[X]/(X^N + 1)` for a single prime `q`.
///
/// Inputs are length-`N` residue vectors already reduced modulo `q`; the
/// provided methods trust the kernel's output and never re-check it.
pub trait RingArithmetic {
    fn degree(&self) -> usize;
    fn modulus(&self) -> u64;

    /// Coefficients to evaluations at the odd powers `ψ^(2k+1)`, in order.
    fn forward_in_place(&self, values: &mut [u64]);

    /// Inverse of [`RingArithmetic::forward_in_place`].
    fn inverse_in_place(&self, values: &mut [u64]);

    fn add(&self, lhs: &[u64], rhs: &[u64]) -> Vec<u64> {
        debug_assert_eq!(lhs.len(), self.degree());
        debug_assert_eq!(rhs.len(), self.degree());
        let q = self.modulus();
        lhs.iter().zip(rhs).map(|(&a, &b)| add_mod(a, b, q)).collect()
    }

    /// Negacyclic product via pointwise multiplication in the NTT domain.
    fn multiply(&self, lhs: &[u64], rhs: &[u64]) -> Vec<u64> {
        let q = self.modulus();
        let mut a = self.forward_transform(lhs);
        let b = self.forward_transform(rhs);
        for (x, &y) in a.iter_mut().zip(&b) {
            *x = mul_mod(*x, y, q);
        }
        self.inverse_in_place(&mut a);
        a
    }

    fn forward_transform(&self, poly: &[u64]) -> Vec<u64> {
        debug_assert_eq!(poly.len(), self.degree());
        let mut out = poly.to_vec();
        self.forward_in_place(&mut out);
        out
    }

    fn inverse_transform(&self, evals: &[u64]) -> Vec<u64> {
        debug_assert_eq!(evals.len(), self.degree());
        let mut out = evals.to_vec();
        self.inverse_in_place(&mut out);
        out
    }
}
