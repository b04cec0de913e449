use crate::checker::{DEFAULT_EPSILON, Tolerance};
use crate::reference::ReferenceArithmetic;
use num::complex::Complex64;
use std::fmt;

/// Engine-level value, what encoders consume and decoders produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Complex(Complex64),
}

impl Value {
    /// Value seen as a complex number.
    pub fn as_complex(&self) -> Complex64 {
        match self {
            Value::Integer(x) => Complex64::new(*x as f64, 0.0),
            Value::Complex(z) => *z,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(x) => write!(f, "{}", x),
            Value::Complex(z) => write!(f, "{:.6}{:+.6}i", z.re, z.im),
        }
    }
}

/// Arithmetic class of a scheme, selecting how values are packed and compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Integers modulo a plaintext modulus, compared exactly.
    ExactInteger,
    /// Scaled fixed-point complex numbers, compared within an epsilon.
    Approximate,
}

impl Domain {
    /// Comparison policy of the domain. `epsilon` only applies to
    /// [Domain::Approximate] and defaults to [DEFAULT_EPSILON].
    pub fn tolerance(&self, plaintext_modulus: Option<u64>, epsilon: Option<f64>) -> Tolerance {
        match self {
            Domain::ExactInteger => Tolerance::Exact {
                modulus: plaintext_modulus,
            },
            Domain::Approximate => Tolerance::Epsilon(epsilon.unwrap_or(DEFAULT_EPSILON)),
        }
    }
}

/// What an evaluation context can do, as reported by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub domain: Domain,
    /// Whether the engine offers multiply-then-rescale as one operation.
    pub composed_multiply: bool,
}

/// Scalar type of the coordinates fed to the harness.
pub trait Coordinate: ReferenceArithmetic + Copy + PartialEq + fmt::Debug + fmt::Display {
    const DOMAIN: Domain;

    fn to_value(self) -> Value;

    /// None when the value cannot represent a coordinate of this type.
    fn from_value(value: &Value) -> Option<Self>;
}

impl Coordinate for i64 {
    const DOMAIN: Domain = Domain::ExactInteger;

    fn to_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(x) => Some(*x),
            Value::Complex(_) => None,
        }
    }
}

impl Coordinate for f64 {
    const DOMAIN: Domain = Domain::Approximate;

    fn to_value(self) -> Value {
        Value::Complex(Complex64::new(self, 0.0))
    }

    /// Keeps the real part.
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.as_complex().re)
    }
}

impl Coordinate for Complex64 {
    const DOMAIN: Domain = Domain::Approximate;

    fn to_value(self) -> Value {
        Value::Complex(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.as_complex())
    }
}
