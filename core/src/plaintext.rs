use num_bigint::BigInt;

/// Integer polynomial carrying encoded values.
#[derive(Clone, Debug, PartialEq)]
pub struct Plaintext {
    /// Signed coefficients.
    pub coeffs: Vec<BigInt>,
    /// Scaling factor of the encoding, 1 for exact encodings.
    pub scale: f64,
    /// Number of encoded values.
    pub len: usize,
}
