use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use hedist_sampling::distributions::Distributions;
use hedist_sampling::source::Source;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut()
            .for_each(|a| *a = source.next_u64n(max, mask));
    }
}

impl RingRNS<u64> {
    /// Fills every limb of a independently, i.e. a is uniform mod Q.
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, r)| r.fill_uniform(source, a.at_mut(i)));
    }

    /// Samples one small polynomial from dist and writes it in every limb of a.
    /// Returns the signed coefficients.
    pub fn fill_dist(&self, source: &mut Source, dist: &Distributions, a: &mut PolyRNS<u64>) -> Vec<i64> {
        let mut coeffs: Vec<i64> = vec![0; self.n()];
        dist.fill(source, &mut coeffs);
        self.from_i64_inplace(&coeffs, a);
        coeffs
    }
}
