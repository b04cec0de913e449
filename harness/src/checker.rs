use crate::domain::Value;
use tracing::warn;

/// Default epsilon of approximate comparisons, suited to a 2^40 scale.
pub const DEFAULT_EPSILON: f64 = 1e-2;

/// How a decrypted value is compared with its reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    /// Equality, modulo the plaintext modulus when there is one.
    Exact { modulus: Option<u64> },
    /// |reference - decrypted| < epsilon on the first slot. An epsilon of
    /// zero rejects every approximate result.
    Epsilon(f64),
}

impl Tolerance {
    /// Compares the first values of both sequences and logs a warning on
    /// mismatch. An empty decrypted sequence never matches.
    pub fn check(&self, label: &str, reference: &[Value], decrypted: &[Value]) -> bool {
        let (expected, got) = match (reference.first(), decrypted.first()) {
            (Some(expected), Some(got)) => (expected, got),
            _ => {
                warn!(label, "nothing to compare");
                return false;
            }
        };

        let ok: bool = match self {
            Tolerance::Exact { modulus } => match (expected, got) {
                (Value::Integer(a), Value::Integer(b)) => match modulus {
                    Some(m) => {
                        let m: i128 = *m as i128;
                        (*a as i128).rem_euclid(m) == (*b as i128).rem_euclid(m)
                    }
                    None => a == b,
                },
                _ => expected == got,
            },
            Tolerance::Epsilon(eps) => (expected.as_complex() - got.as_complex()).norm() < *eps,
        };

        if !ok {
            warn!(%expected, %got, tolerance = ?self, "{} mismatch", label);
        }

        ok
    }
}
