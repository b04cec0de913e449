use crate::dft::ntt::Table;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{BARRETT, REDUCEMOD, ReduceOnce, VectorOperations};
use crate::poly::Poly;
use crate::ring::Ring;

impl Ring<u64> {
    /// Panics if n is not a power of two or if q is not an odd prime with q = 1 mod 2n.
    pub fn new(n: usize, q: u64) -> Self {
        assert!(
            n.is_power_of_two() && n >= 2,
            "invalid argument: n={} is not a power of two >= 2",
            n
        );
        let prime: Prime<u64> = Prime::<u64>::new(q);
        Self {
            n,
            modulus: prime.clone(),
            dft: Box::new(Table::<u64>::new(prime, (2 * n) as u64)),
        }
    }

    /// Assigns the signed coefficients to a, reduced mod q.
    pub fn from_i64(&self, coeffs: &[i64], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() == a.n(), "coeffs.len()={} != a.n()={}", coeffs.len(), a.n());
        a.0.iter_mut()
            .zip(coeffs)
            .for_each(|(a, c)| *a = self.modulus.from_i64(*c));
    }

    /// Assigns the signed coefficients to a, reduced mod q.
    pub fn from_i128(&self, coeffs: &[i128], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() == a.n(), "coeffs.len()={} != a.n()={}", coeffs.len(), a.n());
        a.0.iter_mut()
            .zip(coeffs)
            .for_each(|(a, c)| *a = self.modulus.from_i128(*c));
    }
}

impl Ring<u64> {
    pub fn ntt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.forward_inplace(&mut poly.0)
    }

    pub fn intt_inplace(&self, poly: &mut Poly<u64>) {
        self.dft.backward_inplace(&mut poly.0)
    }

    pub fn ntt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.forward_inplace(&mut poly_out.0)
    }

    pub fn intt(&self, poly_in: &Poly<u64>, poly_out: &mut Poly<u64>) {
        poly_out.0.copy_from_slice(&poly_in.0);
        self.dft.backward_inplace(&mut poly_out.0)
    }
}

impl Ring<u64> {
    /// b <- a + b.
    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_add_vb_into_vb::<REDUCE>(&a.0, &mut b.0);
    }

    /// c <- a + b.
    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_add_vb_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// b <- b - a.
    #[inline(always)]
    pub fn sub_inplace<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_sub_vb_into_va::<REDUCE>(&a.0, &mut b.0);
    }

    /// c <- a - b.
    #[inline(always)]
    pub fn sub<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_sub_vb_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    #[inline(always)]
    pub fn neg_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.va_neg_into_va::<REDUCE>(&mut a.0);
    }

    /// b <- a * 2^64 mod q.
    #[inline(always)]
    pub fn prepare_montgomery<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &mut Poly<Montgomery<u64>>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        b.copy_from(a);
        self.modulus.va_prepare_montgomery_into_va::<REDUCE>(&mut b.0);
    }

    /// c <- a * b with a in the Montgomery domain.
    #[inline(always)]
    pub fn mul_montgomery_external<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mont_mul_vb_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// c <- c + a * b with a in the Montgomery domain.
    #[inline(always)]
    pub fn mul_montgomery_external_add_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .va_mont_mul_vb_add_vc_into_vc::<REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// b <- a * b for any scalar a.
    #[inline(always)]
    pub fn mul_scalar_inplace<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut Poly<u64>) {
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_mul_sb_barrett_into_va::<REDUCE>(
            &self
                .modulus
                .barrett
                .prepare(self.modulus.barrett.reduce::<BARRETT>(a)),
            &mut b.0,
        );
    }

    #[inline(always)]
    pub fn mul_scalar_barrett_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.va_mul_sb_barrett_into_va::<REDUCE>(a, &mut b.0);
    }

    /// b <- (a - b) * c.
    #[inline(always)]
    pub fn a_sub_b_mul_c_scalar_barrett_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        c: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_sub_vb_mul_sc_barrett_into_vb::<REDUCE>(&a.0, c, &mut b.0);
    }

    /// b <- (a >> shift) & mask, the `shift / log2(mask + 1)`-th digit of a.
    #[inline(always)]
    pub fn digit(&self, a: &Poly<u64>, shift: usize, mask: u64, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .va_rsh_sb_mask_sc_into_vc(&a.0, shift, mask, &mut b.0);
    }

    /// b <- a mod q, for a holding arbitrary words.
    #[inline(always)]
    pub fn reduce(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.copy_from(a);
        self.modulus.va_reduce_into_va::<BARRETT>(&mut b.0);
    }

    /// b <- centered(a) mod q, where a holds residues in [0, q_a) and
    /// centered maps them to (-q_a/2, q_a/2].
    pub fn from_centered(&self, a: &Poly<u64>, q_a: u64, b: &mut Poly<u64>) {
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let q: u64 = self.modulus.q;
        let q_a_half: u64 = q_a >> 1;
        let q_a_mod_q: u64 = self.modulus.barrett.reduce::<BARRETT>(&q_a);
        b.0.iter_mut().zip(a.0.iter()).for_each(|(b, a)| {
            *b = self.modulus.barrett.reduce::<BARRETT>(a);
            if *a > q_a_half {
                *b = (*b + q - q_a_mod_q).reduce_once(q);
            }
        });
    }

    /// Returns a^-1 mod q prepared for Shoup multiplication.
    pub fn inv_barrett(&self, a: u64) -> Barrett<u64> {
        self.modulus
            .barrett
            .prepare(self.modulus.inv(self.modulus.barrett.reduce::<BARRETT>(&a)))
    }

    /// Returns a mod q prepared for Shoup multiplication.
    pub fn barrett(&self, a: u64) -> Barrett<u64> {
        self.modulus
            .barrett
            .prepare(self.modulus.barrett.reduce::<BARRETT>(&a))
    }
}
