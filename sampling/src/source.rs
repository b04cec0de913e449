use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};
use rand_core::RngCore;

/// Deterministic randomness source. Every random choice made by the engine
/// (secrets, masks, noise) is drawn from a [Source] so that a fixed seed
/// reproduces a full run.
pub struct Source {
    source: ChaCha8Rng,
}

/// Returns a fresh 32 byte seed drawn from the OS-seeded thread generator.
pub fn new_seed() -> [u8; 32] {
    let mut seed: [u8; 32] = [0u8; 32];
    rand::rng().fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
        }
    }

    /// Seeds a [Source] from a single integer, padding the remaining bytes with zeroes.
    pub fn from_u64(seed: u64) -> Source {
        let mut bytes: [u8; 32] = [0u8; 32];
        bytes[..8].copy_from_slice(&seed.to_le_bytes());
        Source::new(bytes)
    }

    /// Returns an independent child source together with its seed.
    pub fn branch(&mut self) -> ([u8; 32], Self) {
        let seed: [u8; 32] = self.new_seed();
        (seed, Source::new(seed))
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.fill_bytes(&mut seed);
        seed
    }

    /// Returns a uniform value in [0, max) by rejection on `mask`.
    /// `mask` must be at least `max.next_power_of_two() - 1`.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }
}
