use crate::context::Context;
use crate::error::{Error, Result};
use crate::parameters::Scheme;
use crate::plaintext::Plaintext;
use crate::utils::{bigint_mod, center};
use hedist_backend::modulus::WordOps;
use itertools::izip;
use num::complex::Complex64;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::f64::consts::PI;

/// Maps values to plaintext polynomials.
///
/// [Scheme::Bgv] packs integers in the coefficients, value i going to the
/// coefficient of X^i reduced mod t. [Scheme::Ckks] packs up to N/2 complex
/// values in the evaluations of the polynomial at the primitive 2N-th roots
/// of unity exp(i*pi*(2j+1)/N), slot j and its conjugate slot N-1-j, scaled
/// by a factor and rounded to integers.
pub struct Encoder<'a> {
    context: &'a Context,
}

impl<'a> Encoder<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    /// Number of values a plaintext can hold.
    pub fn slots(&self) -> usize {
        match self.context.params().scheme() {
            Scheme::Bgv => self.context.n(),
            Scheme::Ckks => self.context.n() >> 1,
        }
    }

    pub fn encode_integers(&self, values: &[i64]) -> Result<Plaintext> {
        self.expect_scheme(Scheme::Bgv, "integer encoding")?;
        self.check_len(values.len())?;

        let t: i64 = self.context.params().plaintext_modulus() as i64;
        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); self.context.n()];
        izip!(coeffs.iter_mut(), values).for_each(|(c, v)| *c = BigInt::from(v.rem_euclid(t)));

        Ok(Plaintext {
            coeffs,
            scale: 1.0,
            len: values.len(),
        })
    }

    /// Returns the first `pt.len` coefficients as centered residues mod t.
    pub fn decode_integers(&self, pt: &Plaintext) -> Result<Vec<i64>> {
        self.expect_scheme(Scheme::Bgv, "integer decoding")?;
        let t: u64 = self.context.params().plaintext_modulus();
        Ok(pt
            .coeffs
            .iter()
            .take(pt.len)
            .map(|c| center(bigint_mod(c, t), t))
            .collect())
    }

    /// Encodes values at the given scale, the context default when None.
    pub fn encode_complex(&self, values: &[Complex64], scale: Option<f64>) -> Result<Plaintext> {
        self.expect_scheme(Scheme::Ckks, "complex encoding")?;
        self.check_len(values.len())?;

        let scale: f64 = scale.unwrap_or(self.context.params().scale());
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::Encoding(format!("scale={} must be finite and positive", scale)));
        }

        let n: usize = self.context.n();
        let mut w: Vec<Complex64> = vec![Complex64::default(); n];
        values.iter().enumerate().for_each(|(k, z)| {
            w[k] = *z;
            w[n - 1 - k] = z.conj();
        });

        fft(&mut w, -1.0);

        let coeffs: Vec<BigInt> = w
            .iter()
            .enumerate()
            .map(|(j, b)| {
                let twist: Complex64 = Complex64::from_polar(1.0, -PI * j as f64 / n as f64);
                let p: f64 = (b * twist).re / n as f64 * scale;
                BigInt::from_f64(p.round()).ok_or_else(|| {
                    Error::Encoding(format!("coefficient {} is not representable", p))
                })
            })
            .collect::<Result<_>>()?;

        Ok(Plaintext {
            coeffs,
            scale,
            len: values.len(),
        })
    }

    /// Evaluates the plaintext at the slot roots and divides by its scale.
    pub fn decode_complex(&self, pt: &Plaintext) -> Result<Vec<Complex64>> {
        self.expect_scheme(Scheme::Ckks, "complex decoding")?;

        let n: usize = self.context.n();
        if pt.coeffs.len() != n {
            return Err(Error::Encoding(format!(
                "plaintext has {} coefficients, expected N={}",
                pt.coeffs.len(),
                n
            )));
        }

        let mut a: Vec<Complex64> = pt
            .coeffs
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let x: f64 = c
                    .to_f64()
                    .ok_or_else(|| Error::Encoding(format!("coefficient {} overflows f64", c)))?;
                Ok(Complex64::from_polar(x / pt.scale, PI * j as f64 / n as f64))
            })
            .collect::<Result<_>>()?;

        fft(&mut a, 1.0);

        a.truncate(pt.len.min(n >> 1));
        Ok(a)
    }

    fn expect_scheme(&self, scheme: Scheme, what: &str) -> Result<()> {
        if self.context.params().scheme() != scheme {
            return Err(Error::Unsupported(format!(
                "{} on a {:?} context",
                what,
                self.context.params().scheme()
            )));
        }
        Ok(())
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len > self.slots() {
            return Err(Error::Encoding(format!(
                "{} values exceed the {} available slots",
                len,
                self.slots()
            )));
        }
        Ok(())
    }
}

/// In-place radix-2 transform a_j <- sum_k a_k * exp(sign * 2*i*pi*j*k/n).
/// a.len() must be a power of two.
fn fft(a: &mut [Complex64], sign: f64) {
    let n: usize = a.len();
    if n <= 1 {
        return;
    }
    debug_assert!(n.is_power_of_two(), "n={} is not a power of two", n);

    let log_n: u32 = n.trailing_zeros();
    (0..n).for_each(|i| {
        let j: usize = i.reverse_bits_msb(log_n);
        if i < j {
            a.swap(i, j);
        }
    });

    let mut size: usize = 2;
    while size <= n {
        let half: usize = size >> 1;
        let twiddles: Vec<Complex64> = (0..half)
            .map(|k| Complex64::from_polar(1.0, sign * 2.0 * PI * k as f64 / size as f64))
            .collect();
        a.chunks_exact_mut(size).for_each(|chunk| {
            let (lo, hi) = chunk.split_at_mut(half);
            izip!(lo.iter_mut(), hi.iter_mut(), twiddles.iter()).for_each(|(x, y, w)| {
                let u: Complex64 = *x;
                let v: Complex64 = *y * w;
                *x = u + v;
                *y = u - v;
            });
        });
        size <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{KeySwitching, ModulusChain, ParametersLiteral};
    use crate::security::SecurityLevel;

    fn context(scheme: Scheme, n: usize) -> Context {
        Context::new(&ParametersLiteral {
            scheme,
            plaintext_modulus: 65537,
            ring_degree: Some(n),
            chain: ModulusChain::Bits {
                data: vec![60, 40],
                special: Some(60),
            },
            leveled: true,
            key_switching: KeySwitching::Hybrid,
            security: SecurityLevel::NotSet,
            sigma: 3.19,
            scale: Some((1u64 << 30) as f64),
        })
        .unwrap()
    }

    #[test]
    fn fft_matches_naive_dft() {
        let n: usize = 8;
        let x: Vec<Complex64> = (0..n)
            .map(|i| Complex64::new(i as f64 - 3.0, (i * i) as f64 * 0.5))
            .collect();
        let mut y: Vec<Complex64> = x.clone();
        fft(&mut y, 1.0);
        (0..n).for_each(|j| {
            let expected: Complex64 = (0..n)
                .map(|k| x[k] * Complex64::from_polar(1.0, 2.0 * PI * (j * k) as f64 / n as f64))
                .sum();
            assert!((y[j] - expected).norm() < 1e-9);
        });
    }

    #[test]
    fn integers_are_reduced_and_centered() {
        let ctx: Context = context(Scheme::Bgv, 16);
        let encoder: Encoder = Encoder::new(&ctx);
        let pt: Plaintext = encoder.encode_integers(&[-1, 65537 + 4, 32768]).unwrap();
        assert_eq!(pt.coeffs[0], BigInt::from(65536));
        assert_eq!(pt.coeffs[1], BigInt::from(4));
        assert!(pt.coeffs[3..].iter().all(|c| *c == BigInt::default()));
        assert_eq!(encoder.decode_integers(&pt).unwrap(), vec![-1, 4, 32768]);
    }

    #[test]
    fn too_many_values_are_rejected() {
        let ctx: Context = context(Scheme::Ckks, 16);
        let encoder: Encoder = Encoder::new(&ctx);
        assert_eq!(encoder.slots(), 8);
        let values: Vec<Complex64> = vec![Complex64::new(1.0, 0.0); 9];
        assert!(matches!(encoder.encode_complex(&values, None), Err(Error::Encoding(_))));
        assert!(matches!(encoder.encode_integers(&[1]), Err(Error::Unsupported(_))));
    }

    #[test]
    fn encoded_polynomial_product_multiplies_slots() {
        let n: usize = 16;
        let ctx: Context = context(Scheme::Ckks, n);
        let encoder: Encoder = Encoder::new(&ctx);
        let a: Vec<Complex64> = vec![Complex64::new(1.5, 0.25), Complex64::new(-0.75, 2.0)];
        let b: Vec<Complex64> = vec![Complex64::new(0.5, -1.0), Complex64::new(3.0, 0.0)];
        let pa: Plaintext = encoder.encode_complex(&a, None).unwrap();
        let pb: Plaintext = encoder.encode_complex(&b, None).unwrap();

        // Negacyclic product over the integers.
        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); n];
        (0..n).for_each(|i| {
            (0..n).for_each(|j| {
                let p: BigInt = &pa.coeffs[i] * &pb.coeffs[j];
                if i + j < n {
                    coeffs[i + j] += p;
                } else {
                    coeffs[i + j - n] -= p;
                }
            })
        });
        let product: Plaintext = Plaintext {
            coeffs,
            scale: pa.scale * pb.scale,
            len: 2,
        };

        let decoded: Vec<Complex64> = encoder.decode_complex(&product).unwrap();
        izip!(&a, &b, &decoded).for_each(|(a, b, c)| assert!((a * b - c).norm() < 1e-6));
    }
}
