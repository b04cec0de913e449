use crate::modulus::barrett::BarrettPrecomp;

/// x * 2^64 mod q.
pub type Montgomery<O> = O;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub barrett: BarrettPrecomp<O>,
    /// q^-1 mod 2^64.
    pub q_inv: O,
    /// 2^128 mod q, maps a word into the Montgomery domain.
    pub r2: O,
    pub one: Montgomery<O>,
}
