use hedist_backend::poly::PolyRNS;

/// Ciphertext (c_0, ..., c_d) in the NTT domain, decrypting to
/// sum c_i * s^i = correction * scale * m + small error mod q_0 * ... * q_level.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    pub(crate) c: Vec<PolyRNS<u64>>,
    pub(crate) level: usize,
    pub(crate) scale: f64,
    pub(crate) correction: u64,
    pub(crate) len: usize,
}

impl Ciphertext {
    /// Index of the last prime of the modulus.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn degree(&self) -> usize {
        self.c.len() - 1
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Factor mod t picked up by modulus switching, 1 when fresh.
    pub fn correction(&self) -> u64 {
        self.correction
    }

    /// Number of encrypted values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
