pub mod impl_u64;

use crate::dft::DFT;
use crate::modulus::prime::Prime;
use crate::poly::{Poly, PolyRNS};
use num::traits::Unsigned;
use std::rc::Rc;

/// `Z_q[X]/(X^N + 1)` for a single NTT-friendly prime q.
pub struct Ring<O: Unsigned> {
    pub n: usize,
    pub modulus: Prime<O>,
    pub dft: Box<dyn DFT<O>>,
}

impl<O: Unsigned> Ring<O> {
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }
}

/// `Z_Q[X]/(X^N + 1)` with `Q = q_0 * ... * q_L`, held as one shared [Ring]
/// per prime so that sub-rings and extensions reuse the NTT tables.
#[derive(Clone)]
pub struct RingRNS<O: Unsigned>(pub Vec<Rc<Ring<O>>>);

impl<O: Unsigned> RingRNS<O> {
    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    pub fn new_polyrns(&self) -> PolyRNS<u64> {
        PolyRNS::<u64>::new(self.n(), self.level())
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }

    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns the sub-ring over `q_0, ..., q_level`.
    pub fn at_level(&self, level: usize) -> RingRNS<O> {
        assert!(
            level <= self.level(),
            "invalid argument level: level={} > self.level()={}",
            level,
            self.level()
        );
        RingRNS(self.0[..level + 1].to_vec())
    }

    /// Returns the ring over the primes of `self` followed by those of `other`.
    pub fn extended_with(&self, other: &RingRNS<O>) -> RingRNS<O> {
        RingRNS(self.0.iter().chain(other.0.iter()).cloned().collect())
    }
}
