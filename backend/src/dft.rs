pub mod ntt;

/// In-place transform between the coefficient and evaluation domains of
/// `Z_q[X]/(X^N + 1)`.
pub trait DFT<O> {
    fn forward_inplace(&self, a: &mut [O]);
    fn backward_inplace(&self, a: &mut [O]);
}
