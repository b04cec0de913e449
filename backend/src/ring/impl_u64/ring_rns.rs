use crate::modulus::montgomery::Montgomery;
use crate::modulus::REDUCEMOD;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS};
use num::Integer;
use num_bigint::BigInt;
use std::rc::Rc;

impl RingRNS<u64> {
    /// Panics if moduli is empty or if any modulus is not an odd prime = 1 mod 2n.
    pub fn new(n: usize, moduli: &[u64]) -> Self {
        assert!(!moduli.is_empty(), "moduli cannot be empty");
        RingRNS(moduli.iter().map(|q| Rc::new(Ring::new(n, *q))).collect())
    }

    pub fn moduli(&self) -> Vec<u64> {
        self.0.iter().map(|r| r.modulus.q).collect()
    }

    /// Returns Q = q_0 * ... * q_level.
    pub fn modulus(&self) -> BigInt {
        self.0
            .iter()
            .fold(BigInt::from(1u64), |acc, r| acc * BigInt::from(r.modulus.q))
    }

    /// Returns (Q / q_i) mod q_i for each i.
    fn crt_hat_residues(&self) -> Vec<u64> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, ri)| {
                let qi: u128 = ri.modulus.q as u128;
                self.0
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .fold(1u128, |acc, (_, rj)| acc * (rj.modulus.q as u128 % qi) % qi)
                    as u64
            })
            .collect()
    }

    pub fn from_i64_inplace(&self, coeffs: &[i64], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.from_i64(coeffs, a.at_mut(i)));
    }

    pub fn from_i128_inplace(&self, coeffs: &[i128], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.from_i128(coeffs, a.at_mut(i)));
    }

    /// Assigns the integer coefficients to a, reduced mod each q_i.
    pub fn from_bigint_inplace(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let q_big: BigInt = BigInt::from(ring.modulus.q);
            a.at_mut(i)
                .0
                .iter_mut()
                .zip(coeffs)
                .for_each(|(a, c)| *a = c.mod_floor(&q_big).iter_u64_digits().next().unwrap_or(0));
        });
    }

    /// Reconstructs the coefficients of a, expected in the coefficient domain,
    /// as integers centered in (-Q/2, Q/2].
    pub fn to_bigint_inplace(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        assert!(
            coeffs.len() == a.n(),
            "invalid coeffs: coeffs.len()={} != a.n()={}",
            coeffs.len(),
            a.n()
        );
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());

        let q_big: BigInt = self.modulus();
        let q_big_half: BigInt = &q_big >> 1;

        let inv_crt: Vec<BigInt> = self
            .crt_hat_residues()
            .iter()
            .zip(self.0.iter())
            .map(|(hat, ring)| {
                let q_hat: BigInt = &q_big / BigInt::from(ring.modulus.q);
                q_hat * BigInt::from(ring.modulus.inv(*hat))
            })
            .collect();

        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            *c = (0..self.level() + 1).fold(BigInt::from(0u64), |acc, k| {
                acc + BigInt::from(a.at(k).0[j]) * &inv_crt[k]
            });
            *c %= &q_big;
            if *c > q_big_half {
                *c -= &q_big;
            }
        });
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace(&self, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt_inplace(a.at_mut(i)));
    }

    pub fn intt_inplace(&self, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt_inplace(a.at_mut(i)));
    }
}

impl RingRNS<u64> {
    /// c <- a + b.
    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.add::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    /// b <- a + b.
    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.add_inplace::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    /// c <- a - b.
    #[inline(always)]
    pub fn sub<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.sub::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
    }

    /// b <- b - a.
    #[inline(always)]
    pub fn sub_inplace<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.sub_inplace::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn neg_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.neg_inplace::<REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn prepare_montgomery<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<Montgomery<u64>>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.prepare_montgomery::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    /// c <- a * b with a in the Montgomery domain.
    #[inline(always)]
    pub fn mul_montgomery_external<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    /// c <- c + a * b with a in the Montgomery domain.
    #[inline(always)]
    pub fn mul_montgomery_external_add_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        debug_assert!(a.level() >= self.level(), "a.level()={} < self.level()={}", a.level(), self.level());
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        debug_assert!(c.level() >= self.level(), "c.level()={} < self.level()={}", c.level(), self.level());
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external_add_inplace::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    /// b <- a * b for any scalar a.
    #[inline(always)]
    pub fn mul_scalar_inplace<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut PolyRNS<u64>) {
        debug_assert!(b.level() >= self.level(), "b.level()={} < self.level()={}", b.level(), self.level());
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.mul_scalar_inplace::<REDUCE>(a, b.at_mut(i)));
    }
}
