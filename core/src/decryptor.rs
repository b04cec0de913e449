use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::keys::SecretKey;
use crate::parameters::Scheme;
use crate::plaintext::Plaintext;
use crate::utils::{bigint_mod, center, inv_mod, mul_mod};
use hedist_backend::modulus::ONCE;
use hedist_backend::poly::PolyRNS;
use hedist_backend::ring::RingRNS;
use num_bigint::BigInt;

pub struct Decryptor<'a> {
    context: &'a Context,
    sk: &'a SecretKey,
}

impl<'a> Decryptor<'a> {
    pub fn new(context: &'a Context, sk: &'a SecretKey) -> Self {
        Self { context, sk }
    }

    /// Evaluates sum c_i * s^i at the level of ct and lifts it to centered
    /// integers. For [Scheme::Bgv] the result is reduced mod t and the
    /// modulus-switching correction is removed.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if ct.level > self.context.max_level() || self.sk.s.level() < ct.level {
            return Err(Error::Mismatch(format!(
                "ciphertext at level {} does not belong to this context",
                ct.level
            )));
        }

        let ring: RingRNS<u64> = self.context.ring_q(ct.level);

        // Horner evaluation from the highest component down.
        let mut acc: PolyRNS<u64> = ring.new_polyrns();
        acc.copy_level(ct.level, &ct.c[ct.degree()]);
        let mut tmp: PolyRNS<u64> = ring.new_polyrns();
        ct.c[..ct.degree()].iter().rev().for_each(|c| {
            ring.mul_montgomery_external::<ONCE>(&self.sk.s_mont, &acc, &mut tmp);
            ring.add::<ONCE>(&tmp, c, &mut acc);
        });

        ring.intt_inplace(&mut acc);
        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); ring.n()];
        ring.to_bigint_inplace(&acc, &mut coeffs);

        match self.context.params().scheme() {
            Scheme::Bgv => {
                let t: u64 = self.context.params().plaintext_modulus();
                let correction_inv: u64 = inv_mod(ct.correction, t).ok_or_else(|| {
                    Error::Mismatch(format!(
                        "correction {} is not invertible mod t={}",
                        ct.correction, t
                    ))
                })?;
                let coeffs: Vec<BigInt> = coeffs
                    .iter()
                    .map(|c| BigInt::from(center(mul_mod(bigint_mod(c, t), correction_inv, t), t)))
                    .collect();
                Ok(Plaintext {
                    coeffs,
                    scale: 1.0,
                    len: ct.len,
                })
            }
            Scheme::Ckks => Ok(Plaintext {
                coeffs,
                scale: ct.scale,
                len: ct.len,
            }),
        }
    }
}
