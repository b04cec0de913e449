pub mod barrett;
pub mod impl_u64;
pub mod montgomery;
pub mod prime;
pub mod prime_generation;

/// Output range selector of the modular operations.
pub type REDUCEMOD = u8;

/// No reduction, the output range is given by the operation.
pub const NONE: REDUCEMOD = 0;
/// Conditional subtraction of q.
pub const ONCE: REDUCEMOD = 1;
/// Full Barrett reduction of a word into [0, q).
pub const BARRETT: REDUCEMOD = 2;

pub trait WordOps<O> {
    fn log2(self) -> usize;
    fn reverse_bits_msb(self, n: u32) -> O;
    fn mask(self) -> O;
}

impl WordOps<u64> for u64 {
    /// Number of bits needed to write self - 1, i.e. ceil(log2(self)) for self > 1.
    #[inline(always)]
    fn log2(self) -> usize {
        (u64::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> u64 {
        self.reverse_bits() >> (u64::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> u64 {
        (1 << self.log2()) - 1
    }
}

impl WordOps<usize> for usize {
    #[inline(always)]
    fn log2(self) -> usize {
        (usize::BITS - (self - 1).leading_zeros()) as _
    }
    #[inline(always)]
    fn reverse_bits_msb(self, n: u32) -> usize {
        self.reverse_bits() >> (usize::BITS - n)
    }
    #[inline(always)]
    fn mask(self) -> usize {
        (1 << self.log2()) - 1
    }
}

pub trait ReduceOnce<O> {
    /// Assigns self-q to self if self >= q.
    /// User must ensure that 2q fits in O.
    fn reduce_once_assign(&mut self, q: O);
    /// Returns self-q if self >= q else self.
    /// User must ensure that 2q fits in O.
    fn reduce_once(&self, q: O) -> O;
}

/// Element-wise modular operations over slices, implemented by [prime::Prime].
///
/// Naming follows `va_<op>_vb_into_vc`: `va`, `vb` are vectors, `sb` a scalar,
/// and the suffix names the output.
pub trait VectorOperations<O> {
    // vec(a) <- vec(a) mod q.
    fn va_reduce_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(b) <- vec(a) + vec(b).
    fn va_add_vb_into_vb<const REDUCE: REDUCEMOD>(&self, a: &[O], b: &mut [O]);

    // vec(c) <- vec(a) + vec(b).
    fn va_add_vb_into_vc<const REDUCE: REDUCEMOD>(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(a) <- vec(a) - vec(b).
    fn va_sub_vb_into_va<const REDUCE: REDUCEMOD>(&self, b: &[O], a: &mut [O]);

    // vec(c) <- vec(a) - vec(b).
    fn va_sub_vb_into_vc<const REDUCE: REDUCEMOD>(&self, a: &[O], b: &[O], c: &mut [O]);

    // vec(a) <- -vec(a).
    fn va_neg_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(a) <- vec(a) * 2^64.
    fn va_prepare_montgomery_into_va<const REDUCE: REDUCEMOD>(&self, a: &mut [O]);

    // vec(c) <- vec(a) * vec(b), vec(a) in the Montgomery domain.
    fn va_mont_mul_vb_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        a: &[montgomery::Montgomery<O>],
        b: &[O],
        c: &mut [O],
    );

    // vec(c) <- vec(c) + vec(a) * vec(b), vec(a) in the Montgomery domain.
    fn va_mont_mul_vb_add_vc_into_vc<const REDUCE: REDUCEMOD>(
        &self,
        a: &[montgomery::Montgomery<O>],
        b: &[O],
        c: &mut [O],
    );

    // vec(a) <- vec(a) * scalar(b).
    fn va_mul_sb_barrett_into_va<const REDUCE: REDUCEMOD>(
        &self,
        b: &barrett::Barrett<O>,
        a: &mut [O],
    );

    // vec(b) <- (vec(a) + q - vec(b)) * scalar(c).
    fn va_sub_vb_mul_sc_barrett_into_vb<const REDUCE: REDUCEMOD>(
        &self,
        a: &[O],
        c: &barrett::Barrett<O>,
        b: &mut [O],
    );

    // vec(c) <- (vec(a) >> scalar(b)) & scalar(mask).
    fn va_rsh_sb_mask_sc_into_vc(&self, a: &[O], b: usize, mask: O, c: &mut [O]);
}
