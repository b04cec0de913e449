use primality_test::is_prime;

/// Largest modulus supported by the word-size arithmetic.
pub const MAX_PRIME: u64 = 1 << 61;

/// Enumerates primes q = 1 mod nth_root within half a bit of 2^bit_size,
/// alternately above and below it. Every prime is returned at most once per
/// generator.
pub struct NTTFriendlyPrimesGenerator {
    size: f64,
    next_prime: u64,
    prev_prime: u64,
    nth_root: u64,
    check_next_prime: bool,
    check_prev_prime: bool,
}

impl NTTFriendlyPrimesGenerator {
    pub fn new(bit_size: u32, nth_root: u64) -> Self {
        assert!(
            nth_root.is_power_of_two(),
            "invalid argument: nth_root = {} is not a power of two",
            nth_root
        );
        assert!(
            (1..=61).contains(&bit_size),
            "invalid argument: bit_size = {} not in [1, 61]",
            bit_size
        );

        let next_prime: u64 = (1 << bit_size) + 1;

        let (prev_prime, check_prev_prime) = match next_prime.checked_sub(nth_root) {
            Some(prev) if prev > 1 => (prev, true),
            _ => (0, false),
        };

        Self {
            size: bit_size as f64,
            check_next_prime: next_prime <= MAX_PRIME,
            check_prev_prime,
            nth_root,
            next_prime,
            prev_prime,
        }
    }

    /// Returns the next prime alternating above and below 2^bit_size, keeping
    /// the sequence centered on 2^bit_size.
    pub fn next_alternating_prime(&mut self) -> Option<u64> {
        while self.check_next_prime || self.check_prev_prime {
            if self.check_next_prime {
                if let Some(q) = self.step_upstream() {
                    return Some(q);
                }
            }
            if self.check_prev_prime {
                if let Some(q) = self.step_downstream() {
                    return Some(q);
                }
            }
        }
        None
    }

    fn step_upstream(&mut self) -> Option<u64> {
        let candidate: u64 = self.next_prime;
        if (candidate as f64).log2() - self.size >= 0.5 || candidate > MAX_PRIME - self.nth_root {
            self.check_next_prime = false;
            return None;
        }
        self.next_prime += self.nth_root;
        is_prime(candidate).then_some(candidate)
    }

    fn step_downstream(&mut self) -> Option<u64> {
        let candidate: u64 = self.prev_prime;
        if self.size - (candidate as f64).log2() >= 0.5 || candidate <= self.nth_root {
            self.check_prev_prime = false;
            return None;
        }
        self.prev_prime -= self.nth_root;
        is_prime(candidate).then_some(candidate)
    }
}
