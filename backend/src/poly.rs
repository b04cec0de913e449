/// Coefficients (or evaluations) of a polynomial modulo a single prime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly<O>(pub Vec<O>);

impl<O> Poly<O>
where
    O: Default + Clone + Copy,
{
    pub fn new(n: usize) -> Self {
        Self(vec![O::default(); n])
    }

    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn set_all(&mut self, v: &O) {
        self.0.fill(*v)
    }

    pub fn zero(&mut self) {
        self.set_all(&O::default())
    }

    pub fn copy_from(&mut self, other: &Poly<O>) {
        self.0.resize(other.n(), O::default());
        self.0.copy_from_slice(&other.0)
    }
}

/// A polynomial in RNS representation: one [Poly] per prime of the ring,
/// `level + 1` limbs in total.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PolyRNS<O>(pub Vec<Poly<O>>);

impl<O> PolyRNS<O>
where
    O: Default + Clone + Copy,
{
    pub fn new(n: usize, level: usize) -> Self {
        Self(vec![Poly::new(n); level + 1])
    }

    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    pub fn at(&self, level: usize) -> &Poly<O> {
        assert!(
            level <= self.level(),
            "invalid argument level: level={} > self.level()={}",
            level,
            self.level()
        );
        &self.0[level]
    }

    pub fn at_mut(&mut self, level: usize) -> &mut Poly<O> {
        &mut self.0[level]
    }

    pub fn split_at_mut(&mut self, level: usize) -> (&mut [Poly<O>], &mut [Poly<O>]) {
        self.0.split_at_mut(level)
    }

    pub fn zero(&mut self) {
        self.0.iter_mut().for_each(|poly| poly.zero())
    }

    /// Drops the limbs above `level`.
    pub fn truncate(&mut self, level: usize) {
        assert!(
            level <= self.level(),
            "invalid argument level: level={} > self.level()={}",
            level,
            self.level()
        );
        self.0.truncate(level + 1)
    }

    /// Copies the first `level + 1` limbs of `other` into `self`, resizing `self` to `level`.
    pub fn copy_level(&mut self, level: usize, other: &PolyRNS<O>) {
        assert!(
            other.level() >= level,
            "invalid argument level: level={} > other.level()={}",
            level,
            other.level()
        );
        let n: usize = other.n();
        self.0.resize(level + 1, Poly::new(n));
        self.0
            .iter_mut()
            .zip(other.0.iter())
            .for_each(|(a, b)| a.copy_from(b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_and_copy_level() {
        let mut a: PolyRNS<u64> = PolyRNS::new(8, 3);
        a.at_mut(2).set_all(&7);
        let mut b: PolyRNS<u64> = PolyRNS::default();
        b.copy_level(2, &a);
        assert_eq!(b.level(), 2);
        assert_eq!(b.at(2).0, vec![7u64; 8]);
        a.truncate(1);
        assert_eq!(a.level(), 1);
        assert_eq!(a.n(), 8);
    }
}
