use crate::dft::DFT;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{BARRETT, NONE, ONCE, ReduceOnce, WordOps};
use itertools::izip;

/// Negacyclic NTT over `Z_q[X]/(X^N + 1)` with `nth_root = 2N`.
///
/// The forward transform is a Cooley-Tukey pass over bit-reversed powers
/// of `psi`, the backward transform the matching Gentleman-Sande pass with
/// the `N^-1` scaling folded into its last layer. Outputs are in `[0, q)`,
/// the evaluation domain is in bit-reversed order.
pub struct Table<O> {
    prime: Prime<O>,
    psi: O,
    psi_forward_rev: Vec<Barrett<u64>>,
    psi_backward_rev: Vec<Barrett<u64>>,
    q: O,
    two_q: O,
    four_q: O,
}

impl Table<u64> {
    pub fn new(prime: Prime<u64>, nth_root: u64) -> Table<u64> {
        assert!(
            nth_root.is_power_of_two() && nth_root >= 4,
            "invalid argument: nth_root = {} is not a power of two >= 4",
            nth_root
        );

        let psi: u64 = prime.primitive_nth_root(nth_root);

        let psi_mont: Montgomery<u64> = prime.montgomery.prepare::<ONCE>(psi);
        let psi_inv_mont: Montgomery<u64> = prime.montgomery.pow(psi_mont, prime.phi - 1);

        let half: usize = (nth_root >> 1) as usize;

        let mut psi_forward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); half];
        let mut psi_backward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); half];

        psi_forward_rev[0] = prime.barrett.prepare(1);
        psi_backward_rev[0] = prime.barrett.prepare(1);

        let log_half: u32 = half.log2() as _;

        let mut powers_forward: u64 = 1u64;
        let mut powers_backward: u64 = 1u64;

        for i in 1..half {
            let i_rev: usize = i.reverse_bits_msb(log_half);

            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_mont, &mut powers_forward);
            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_inv_mont, &mut powers_backward);

            psi_forward_rev[i_rev] = prime.barrett.prepare(powers_forward);
            psi_backward_rev[i_rev] = prime.barrett.prepare(powers_backward);
        }

        let q: u64 = prime.q();

        Self {
            prime,
            psi,
            psi_forward_rev,
            psi_backward_rev,
            q,
            two_q: q << 1,
            four_q: q << 2,
        }
    }

    /// Primitive nth_root of unity the table is built on.
    pub fn psi(&self) -> u64 {
        self.psi
    }

    pub fn prime(&self) -> &Prime<u64> {
        &self.prime
    }
}

impl DFT<u64> for Table<u64> {
    fn forward_inplace(&self, a: &mut [u64]) {
        self.forward_inplace_core(a)
    }

    fn backward_inplace(&self, a: &mut [u64]) {
        self.backward_inplace_core(a)
    }
}

impl Table<u64> {
    fn forward_inplace_core(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(
            n.is_power_of_two() && n <= self.psi_forward_rev.len(),
            "invalid a.len() = {}: must be a power of two <= {}",
            n,
            self.psi_forward_rev.len()
        );
        let log_n: u32 = n.trailing_zeros();

        for layer in 0..log_n {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dit_inplace(&mut a[0], &mut b[0], psi);
                        self.dit_inplace(&mut a[1], &mut b[1], psi);
                        self.dit_inplace(&mut a[2], &mut b[2], psi);
                        self.dit_inplace(&mut a[3], &mut b[3], psi);
                        self.dit_inplace(&mut a[4], &mut b[4], psi);
                        self.dit_inplace(&mut a[5], &mut b[5], psi);
                        self.dit_inplace(&mut a[6], &mut b[6], psi);
                        self.dit_inplace(&mut a[7], &mut b[7], psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dit_inplace(a, b, psi));
                });
            }
        }

        a.iter_mut()
            .for_each(|a| self.prime.barrett.reduce_assign::<BARRETT>(a));

        debug_assert!(a.iter().all(|a| *a < self.q));
    }

    /// Inputs in [0, 4q), outputs in [0, 4q).
    #[inline(always)]
    fn dit_inplace(&self, a: &mut u64, b: &mut u64, t: &Barrett<u64>) {
        debug_assert!(*a < self.four_q, "a:{} 4q:{}", a, self.four_q);
        debug_assert!(*b < self.four_q, "b:{} 4q:{}", b, self.four_q);
        a.reduce_once_assign(self.two_q);
        let bt: u64 = self.prime.barrett.mul_external::<NONE>(t, b);
        *b = *a + self.two_q - bt;
        *a += bt;
    }

    fn backward_inplace_core(&self, a: &mut [u64]) {
        let n: usize = a.len();
        assert!(
            n.is_power_of_two() && n <= self.psi_backward_rev.len(),
            "invalid a.len() = {}: must be a power of two <= {}",
            n,
            self.psi_backward_rev.len()
        );
        let log_n: u32 = n.trailing_zeros();

        for layer in (1..log_n).rev() {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dif_inplace(&mut a[0], &mut b[0], psi);
                        self.dif_inplace(&mut a[1], &mut b[1], psi);
                        self.dif_inplace(&mut a[2], &mut b[2], psi);
                        self.dif_inplace(&mut a[3], &mut b[3], psi);
                        self.dif_inplace(&mut a[4], &mut b[4], psi);
                        self.dif_inplace(&mut a[5], &mut b[5], psi);
                        self.dif_inplace(&mut a[6], &mut b[6], psi);
                        self.dif_inplace(&mut a[7], &mut b[7], psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dif_inplace(a, b, psi));
                });
            }
        }

        let n_inv: Barrett<u64> = self.prime.barrett.prepare(self.prime.inv(n as u64));
        let psi: Barrett<u64> = self.prime.barrett.prepare(
            self.prime
                .barrett
                .mul_external::<ONCE>(&n_inv, self.psi_backward_rev[1].value()),
        );

        let (a, b) = a.split_at_mut(n >> 1);
        izip!(a, b).for_each(|(a, b)| self.dif_last_inplace(a, b, &psi, &n_inv));
    }

    /// Inputs in [0, 2q), outputs in [0, 2q).
    #[inline(always)]
    fn dif_inplace(&self, a: &mut u64, b: &mut u64, t: &Barrett<u64>) {
        debug_assert!(*a < self.two_q, "a:{} 2q:{}", a, self.two_q);
        debug_assert!(*b < self.two_q, "b:{} 2q:{}", b, self.two_q);
        let d: u64 = self
            .prime
            .barrett
            .mul_external::<NONE>(t, &(*a + self.two_q - *b));
        *a += *b;
        a.reduce_once_assign(self.two_q);
        *b = d;
    }

    /// Last Gentleman-Sande layer, scaled by N^-1. Outputs in [0, q).
    #[inline(always)]
    fn dif_last_inplace(&self, a: &mut u64, b: &mut u64, psi: &Barrett<u64>, n_inv: &Barrett<u64>) {
        debug_assert!(*a < self.two_q);
        debug_assert!(*b < self.two_q);
        let d: u64 = self
            .prime
            .barrett
            .mul_external::<ONCE>(psi, &(*a + self.two_q - *b));
        *a = self.prime.barrett.mul_external::<ONCE>(n_inv, &(*a + *b));
        *b = d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: u64 = 0x1fffffffffe00001;

    fn negacyclic_product(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
        let n: usize = a.len();
        let mut c: Vec<u128> = vec![0; n];
        for i in 0..n {
            for j in 0..n {
                let p: u128 = a[i] as u128 * b[j] as u128 % q as u128;
                if i + j < n {
                    c[i + j] = (c[i + j] + p) % q as u128;
                } else {
                    c[i + j - n] = (c[i + j - n] + q as u128 - p) % q as u128;
                }
            }
        }
        c.into_iter().map(|c| c as u64).collect()
    }

    #[test]
    fn forward_backward_is_identity() {
        for n in [2usize, 4, 8, 16, 64] {
            let table: Table<u64> = Table::new(Prime::new(Q), (n as u64) << 1);
            let a: Vec<u64> = (0..n as u64).map(|i| i.wrapping_mul(0x9e3779b97f4a7c15) % Q).collect();
            let mut b: Vec<u64> = a.clone();
            table.forward_inplace(&mut b);
            assert!(b.iter().all(|x| *x < Q));
            table.backward_inplace(&mut b);
            assert_eq!(a, b, "n={}", n);
        }
    }

    #[test]
    fn pointwise_product_is_negacyclic_convolution() {
        let n: usize = 32;
        let table: Table<u64> = Table::new(Prime::new(Q), (n as u64) << 1);
        let a: Vec<u64> = (0..n as u64).map(|i| (i * i + 7) % Q).collect();
        let b: Vec<u64> = (0..n as u64).map(|i| Q - 1 - i).collect();
        let expected: Vec<u64> = negacyclic_product(&a, &b, Q);

        let (mut a_ntt, mut b_ntt) = (a.clone(), b.clone());
        table.forward_inplace(&mut a_ntt);
        table.forward_inplace(&mut b_ntt);
        let mut c: Vec<u64> = izip!(&a_ntt, &b_ntt)
            .map(|(a, b)| (*a as u128 * *b as u128 % Q as u128) as u64)
            .collect();
        table.backward_inplace(&mut c);
        assert_eq!(c, expected);
    }
}
