use hedist_backend::modulus::montgomery::Montgomery;
use hedist_backend::poly::PolyRNS;

/// Ternary secret s over every prime of the context, in the NTT domain.
pub struct SecretKey {
    pub(crate) s: PolyRNS<u64>,
    pub(crate) s_mont: PolyRNS<Montgomery<u64>>,
}

/// (b, a) = (-a*s + t*e, a) over Q, in the NTT domain.
pub struct PublicKey {
    pub(crate) b: PolyRNS<u64>,
    pub(crate) a: PolyRNS<u64>,
}

/// Encryptions of gadget multiples of s^2, used to bring a degree-2
/// ciphertext back to degree 1.
pub enum RelinearizationKey {
    /// keys[i] encrypts P * g_i * s^2 over Q*P, g_i being the i-th CRT basis
    /// element of Q. Each key is stored as [b, a] with the limb of P last.
    Hybrid { keys: Vec<[PolyRNS<u64>; 2]> },
    /// keys[i][k] encrypts 2^(window*k) * g_i * s^2 over Q.
    Bv {
        window: u32,
        keys: Vec<Vec<[PolyRNS<u64>; 2]>>,
    },
}

impl RelinearizationKey {
    /// Number of key-switching ciphertexts.
    pub fn count(&self) -> usize {
        match self {
            RelinearizationKey::Hybrid { keys } => keys.len(),
            RelinearizationKey::Bv { keys, .. } => keys.iter().map(|k| k.len()).sum(),
        }
    }
}
