/// A constant `c` in [0, q) stored with `floor(c * 2^64 / q)`, so that
/// products by `c` reduce with one high multiplication.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Barrett<O>(pub O, pub O);

impl<O> Barrett<O> {
    #[inline(always)]
    pub fn value(&self) -> &O {
        &self.0
    }

    #[inline(always)]
    pub fn quotient(&self) -> &O {
        &self.1
    }
}

/// Word reduction modulo q, with `hi = floor(2^128 / q) >> 64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrettPrecomp<O> {
    pub q: O,
    pub hi: O,
    pub one: Barrett<O>,
}
