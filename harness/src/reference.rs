use crate::error::{HarnessError, Result};
use num::complex::Complex64;

/// Cleartext arithmetic of a coordinate type: the ground truth the
/// homomorphic results are compared against.
pub trait ReferenceArithmetic: Sized {
    /// (x1 - x2)^2 + (y1 - y2)^2.
    fn squared_distance(x1: Self, y1: Self, x2: Self, y2: Self) -> Result<Self>;

    /// self * other.
    fn product(self, other: Self) -> Result<Self>;
}

/// |a - b|^2 over u64, so that no intermediate wraps around.
fn square_of_difference(a: i64, b: i64) -> Option<u64> {
    let d: u64 = a.abs_diff(b);
    d.checked_mul(d)
}

impl ReferenceArithmetic for i64 {
    fn squared_distance(x1: i64, y1: i64, x2: i64, y2: i64) -> Result<i64> {
        square_of_difference(x1, x2)
            .zip(square_of_difference(y1, y2))
            .and_then(|(dx, dy)| dx.checked_add(dy))
            .and_then(|d| i64::try_from(d).ok())
            .ok_or_else(|| {
                HarnessError::InvalidInput(format!(
                    "squared distance between ({}, {}) and ({}, {}) overflows i64",
                    x1, y1, x2, y2
                ))
            })
    }

    fn product(self, other: i64) -> Result<i64> {
        self.checked_mul(other).ok_or_else(|| {
            HarnessError::InvalidInput(format!("{} * {} overflows i64", self, other))
        })
    }
}

impl ReferenceArithmetic for f64 {
    fn squared_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<f64> {
        let (dx, dy) = (x1 - x2, y1 - y2);
        Ok(dx * dx + dy * dy)
    }

    fn product(self, other: f64) -> Result<f64> {
        Ok(self * other)
    }
}

/// Complex arithmetic, as the slots of the approximate encoding multiply.
impl ReferenceArithmetic for Complex64 {
    fn squared_distance(x1: Self, y1: Self, x2: Self, y2: Self) -> Result<Self> {
        let (dx, dy) = (x1 - x2, y1 - y2);
        Ok(dx * dx + dy * dy)
    }

    fn product(self, other: Self) -> Result<Self> {
        Ok(self * other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_distance() {
        assert_eq!(i64::squared_distance(1304, 103874, 1290, 103789).unwrap(), 7421);
        assert_eq!(i64::squared_distance(-3, 0, 0, 4).unwrap(), 25);
    }

    #[test]
    fn integer_overflow_is_an_error() {
        assert!(matches!(
            i64::squared_distance(i64::MIN, 0, i64::MAX, 0),
            Err(HarnessError::InvalidInput(_))
        ));
        assert!(i64::MAX.product(2).is_err());
    }

    #[test]
    fn approximate_distance() {
        let d: f64 = f64::squared_distance(1.304, 103.874, 1.290, 103.789).unwrap();
        assert!((d - 0.007421).abs() < 1e-9);
        let z: Complex64 = Complex64::squared_distance(
            Complex64::new(1.304, 0.0),
            Complex64::new(103.874, 0.0),
            Complex64::new(1.290, 0.0),
            Complex64::new(103.789, 0.0),
        )
        .unwrap();
        assert!((z.re - d).abs() < 1e-12 && z.im == 0.0);
    }
}
