use crate::modulus::ONCE;
use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::prime::Prime;
use crate::modulus::prime_generation::MAX_PRIME;
use primality_test::is_prime;
use prime_factorization::Factorization;

impl Prime<u64> {
    /// Returns a new instance of Prime<u64>.
    /// Panics if q is not a prime > 2 or if q > 2^61.
    pub fn new(q: u64) -> Self {
        assert!(is_prime(q) && q > 2, "invalid argument: q={} is not an odd prime", q);
        Self::new_unchecked(q)
    }

    /// Returns a new instance of Prime<u64>.
    /// Does not check that q is prime.
    pub fn new_unchecked(q: u64) -> Self {
        assert!(q <= MAX_PRIME, "invalid argument: q={} > 2^61", q);

        let mut prime: Prime<u64> = Self {
            q,
            montgomery: MontgomeryPrecomp::new(q),
            barrett: BarrettPrecomp::new(q),
            phi: q - 1,
            factors: Vec::new(),
        };

        prime.check_factors();

        prime
    }

    /// Returns true if q is an odd prime below 2^61 with q = 1 mod nth_root.
    pub fn is_ntt_friendly(q: u64, nth_root: u64) -> bool {
        q > 2 && q <= MAX_PRIME && q % nth_root == 1 && is_prime(q)
    }

    pub fn q(&self) -> u64 {
        self.q
    }

    /// Returns x^exponent mod q.
    #[inline(always)]
    pub fn pow(&self, x: u64, exponent: u64) -> u64 {
        let x_mont: Montgomery<u64> = self.montgomery.prepare::<ONCE>(x);
        self.montgomery
            .unprepare::<ONCE>(self.montgomery.pow(x_mont, exponent))
    }

    /// Returns x^-1 mod q.
    /// User must ensure that x is not divisible by q.
    #[inline(always)]
    pub fn inv(&self, x: u64) -> u64 {
        self.pow(x, self.phi - 1)
    }

    /// Returns the smallest primitive root of q.
    pub fn primitive_root(&self) -> u64 {
        let mut candidate: u64 = 1;
        loop {
            candidate += 1;
            if self
                .factors
                .iter()
                .all(|factor| self.pow(candidate, self.phi / factor) != 1)
            {
                return candidate;
            }
        }
    }

    /// Returns a primitive nth_root of unity mod q.
    /// Panics if nth_root does not divide q-1.
    pub fn primitive_nth_root(&self, nth_root: u64) -> u64 {
        assert!(
            self.q % nth_root == 1,
            "invalid prime: q = {} % nth_root = {} = {} != 1",
            self.q,
            nth_root,
            self.q % nth_root
        );

        let psi: u64 = self.pow(self.primitive_root(), self.phi / nth_root);

        assert!(
            self.pow(psi, nth_root >> 1) == self.q - 1,
            "invalid nth primitive root: psi^(nth_root/2) != -1 mod q"
        );

        psi
    }

    /// Populates self.factors with the distinct prime factors of q-1.
    fn check_factors(&mut self) {
        if self.factors.is_empty() {
            self.factors = Factorization::run(self.phi)
                .prime_factor_repr()
                .iter()
                .map(|factor| factor.0)
                .collect();
        }
    }
}
