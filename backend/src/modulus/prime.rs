use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

/// An odd prime q <= 2^61 and the precomputations of its word arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
    /// q - 1.
    pub phi: O,
    /// Distinct prime factors of phi, used to find generators.
    pub factors: Vec<O>,
}
