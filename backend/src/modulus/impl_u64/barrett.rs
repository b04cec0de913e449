use crate::modulus::ReduceOnce;
use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::{BARRETT, NONE, ONCE, REDUCEMOD};

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        // (2^128 - 1) / q and 2^128 / q have the same floor when q is not a power of two.
        let mut precomp: BarrettPrecomp<u64> = Self {
            q,
            hi: ((u128::MAX / q as u128) >> 64) as u64,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            BARRETT => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
                x.reduce_once_assign(self.q);
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r: u64 = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns v together with floor(v * 2^64 / q).
    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    /// Returns lhs * rhs mod q, in [0, 2q) before the REDUCE step.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &u64) -> u64 {
        let mut r: u64 = *rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }
}
