use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{BARRETT, ONCE, REDUCEMOD, ReduceOnce, VectorOperations};
use itertools::izip;

impl VectorOperations<u64> for Prime<u64> {
    #[inline(always)]
    fn va_reduce_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [u64]) {
        a.iter_mut()
            .for_each(|a| self.barrett.reduce_assign::<REDUCE>(a));
    }

    #[inline(always)]
    fn va_add_vb_into_vb<const REDUCE: REDUCEMOD>(&self, a: &[u64], b: &mut [u64]) {
        izip!(a, b.iter_mut()).for_each(|(a, b)| {
            *b += *a;
            self.barrett.reduce_assign::<REDUCE>(b);
        });
    }

    #[inline(always)]
    fn va_add_vb_into_vc<const REDUCE: REDUCEMOD>(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        izip!(a, b, c.iter_mut()).for_each(|(a, b, c)| {
            *c = *a + *b;
            self.barrett.reduce_assign::<REDUCE>(c);
        });
    }

    #[inline(always)]
    fn va_sub_vb_into_va<const REDUCE: REDUCEMOD>(&self, b: &[u64], a: &mut [u64]) {
        izip!(a.iter_mut(), b).for_each(|(a, b)| {
            *a = *a + self.q - *b;
            self.barrett.reduce_assign::<REDUCE>(a);
        });
    }

    #[inline(always)]
    fn va_sub_vb_into_vc<const REDUCE: REDUCEMOD>(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        izip!(a, b, c.iter_mut()).for_each(|(a, b, c)| {
            *c = *a + self.q - *b;
            self.barrett.reduce_assign::<REDUCE>(c);
        });
    }

    #[inline(always)]
    fn va_neg_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|a| {
            *a = self.q - *a;
            self.barrett.reduce_assign::<REDUCE>(a);
        });
    }

    #[inline(always)]
    fn va_prepare_montgomery_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [u64]) {
        a.iter_mut().for_each(|a| {
            let x: u64 = *a;
            self.montgomery.prepare_assign::<REDUCE>(x, a)
        });
    }

    #[inline(always)]
    fn va_mont_mul_vb_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        izip!(a, b, c.iter_mut())
            .for_each(|(a, b, c)| *c = self.montgomery.mul_external::<REDUCE>(*a, *b));
    }

    #[inline(always)]
    fn va_mont_mul_vb_add_vc_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        izip!(a, b, c.iter_mut()).for_each(|(a, b, c)| {
            *c += self.montgomery.mul_external::<ONCE>(*a, *b);
            self.barrett.reduce_assign::<REDUCE>(c);
        });
    }

    #[inline(always)]
    fn va_mul_sb_barrett_into_va<const REDUCE: REDUCEMOD>(&self, b: &Barrett<u64>, a: &mut [u64]) {
        a.iter_mut()
            .for_each(|a| self.barrett.mul_external_assign::<REDUCE>(b, a));
    }

    #[inline(always)]
    fn va_sub_vb_mul_sc_barrett_into_vb<const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        c: &Barrett<u64>,
        b: &mut [u64],
    ) {
        izip!(a, b.iter_mut()).for_each(|(a, b)| {
            *b = *a + self.q - *b;
            self.barrett.mul_external_assign::<REDUCE>(c, b);
        });
    }

    #[inline(always)]
    fn va_rsh_sb_mask_sc_into_vc(&self, a: &[u64], b: usize, mask: u64, c: &mut [u64]) {
        izip!(a, c.iter_mut()).for_each(|(a, c)| *c = (*a >> b) & mask);
    }
}

impl Prime<u64> {
    /// Maps a signed value to [0, q).
    #[inline(always)]
    pub fn from_i64(&self, x: i64) -> u64 {
        if x < 0 {
            let r: u64 = self.barrett.reduce::<BARRETT>(&x.unsigned_abs());
            (self.q - r).reduce_once(self.q)
        } else {
            self.barrett.reduce::<BARRETT>(&(x as u64))
        }
    }

    /// Maps a signed 128-bit value to [0, q).
    #[inline(always)]
    pub fn from_i128(&self, x: i128) -> u64 {
        x.rem_euclid(self.q as i128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::NONE;

    #[test]
    fn add_sub_neg() {
        let prime: Prime<u64> = Prime::new(0x1fffffffffe00001);
        let q: u64 = prime.q;
        let a: Vec<u64> = vec![0, 1, q - 1, q >> 1];
        let b: Vec<u64> = vec![q - 1, q - 1, q - 1, 3];
        let mut c: Vec<u64> = vec![0; 4];
        prime.va_add_vb_into_vc::<ONCE>(&a, &b, &mut c);
        assert_eq!(c, vec![q - 1, 0, q - 2, (q >> 1) + 3]);
        prime.va_sub_vb_into_va::<ONCE>(&b, &mut c);
        assert_eq!(c, a);
        prime.va_neg_into_va::<ONCE>(&mut c);
        prime.va_add_vb_into_vb::<ONCE>(&a, &mut c);
        assert!(c.iter().all(|x| *x == 0));
    }

    #[test]
    fn montgomery_product() {
        let prime: Prime<u64> = Prime::new(0x1fffffffffe00001);
        let q: u128 = prime.q as u128;
        let a: Vec<u64> = vec![2, 0x0123456789abcdef, prime.q - 1];
        let b: Vec<u64> = vec![3, 0x0fedcba987654321, prime.q - 1];
        let mut a_mont: Vec<u64> = a.clone();
        prime.va_prepare_montgomery_into_va::<ONCE>(&mut a_mont);
        let mut c: Vec<u64> = vec![0; 3];
        prime.va_mont_mul_vb_into_vc::<ONCE>(&a_mont, &b, &mut c);
        izip!(&a, &b, &c).for_each(|(a, b, c)| assert_eq!(*c as u128, *a as u128 * *b as u128 % q));
        prime.va_mont_mul_vb_add_vc_into_vc::<ONCE>(&a_mont, &b, &mut c);
        izip!(&a, &b, &c).for_each(|(a, b, c)| assert_eq!(*c as u128, 2 * (*a as u128 * *b as u128 % q) % q));
    }

    #[test]
    fn signed_lift() {
        let prime: Prime<u64> = Prime::new(0x1fffffffffe00001);
        assert_eq!(prime.from_i64(-1), prime.q - 1);
        assert_eq!(prime.from_i64(5), 5);
        assert_eq!(prime.from_i128(-(prime.q as i128) * 3 - 2), prime.q - 2);
        let mut v: Vec<u64> = vec![u64::MAX, prime.q];
        prime.va_reduce_into_va::<BARRETT>(&mut v);
        assert_eq!(v, vec![u64::MAX % prime.q, 0]);
        prime.va_reduce_into_va::<NONE>(&mut v);
    }
}
