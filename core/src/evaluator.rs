use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::keys::RelinearizationKey;
use crate::parameters::{Parameters, Scheme};
use crate::utils::{inv_mod, mul_mod};
use hedist_backend::modulus::ONCE;
use hedist_backend::poly::{Poly, PolyRNS};
use hedist_backend::ring::RingRNS;
use itertools::{EitherOrBoth, Itertools};
use tracing::debug;

/// Relative distance under which two scales are considered equal.
const SCALE_TOLERANCE: f64 = 1e-9;

/// Homomorphic operations over ciphertexts of one [Context].
///
/// Every operation returns a fresh ciphertext and leaves its operands
/// untouched. Operands at different levels are first brought down to the
/// lower one: [Scheme::Ckks] drops the extra primes, [Scheme::Bgv] switches
/// modulus, which keeps the noise small at the cost of a correction factor
/// mod t tracked by the ciphertext.
pub struct Evaluator<'a> {
    context: &'a Context,
    rlk: Option<&'a RelinearizationKey>,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Context, rlk: Option<&'a RelinearizationKey>) -> Self {
        Self { context, rlk }
    }

    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.add_or_sub(a, b, false)
    }

    pub fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.add_or_sub(a, b, true)
    }

    /// Tensor product followed by relinearization. Does not rescale.
    pub fn mul(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        if self.rlk.is_none() {
            return Err(Error::MissingRelinearizationKey);
        }
        self.relinearize(&self.tensor(a, b)?)
    }

    /// [Evaluator::mul] followed by [Evaluator::rescale], consuming one level.
    /// Only available on leveled contexts.
    pub fn composed_mul(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        if !self.context.params().leveled() {
            return Err(Error::Unsupported(
                "composed multiplication needs a leveled modulus chain".into(),
            ));
        }
        self.rescale(&self.mul(a, b)?)
    }

    /// Returns the degree 2 ciphertext (a_0 b_0, a_0 b_1 + a_1 b_0, a_1 b_1).
    pub fn tensor(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check(a)?;
        self.check(b)?;
        if a.degree() != 1 || b.degree() != 1 {
            return Err(Error::Unsupported(format!(
                "multiplication of ciphertexts of degree {} and {}",
                a.degree(),
                b.degree()
            )));
        }

        let level: usize = a.level.min(b.level);
        if self.context.params().leveled() && level == 0 {
            return Err(Error::DepthExhausted { level });
        }

        let a: Ciphertext = self.lower_to(a, level)?;
        let b: Ciphertext = self.lower_to(b, level)?;
        let ring: RingRNS<u64> = self.context.ring_q(level);

        let mut a0: PolyRNS<u64> = ring.new_polyrns();
        let mut a1: PolyRNS<u64> = ring.new_polyrns();
        ring.prepare_montgomery::<ONCE>(&a.c[0], &mut a0);
        ring.prepare_montgomery::<ONCE>(&a.c[1], &mut a1);

        let mut d0: PolyRNS<u64> = ring.new_polyrns();
        let mut d1: PolyRNS<u64> = ring.new_polyrns();
        let mut d2: PolyRNS<u64> = ring.new_polyrns();
        ring.mul_montgomery_external::<ONCE>(&a0, &b.c[0], &mut d0);
        ring.mul_montgomery_external::<ONCE>(&a0, &b.c[1], &mut d1);
        ring.mul_montgomery_external_add_inplace::<ONCE>(&a1, &b.c[0], &mut d1);
        ring.mul_montgomery_external::<ONCE>(&a1, &b.c[1], &mut d2);

        Ok(Ciphertext {
            c: vec![d0, d1, d2],
            level,
            scale: a.scale * b.scale,
            correction: self.correction_product(a.correction, b.correction),
            len: a.len.max(b.len),
        })
    }

    /// Brings a degree 2 ciphertext back to degree 1. Degree 1 ciphertexts
    /// are returned unchanged.
    pub fn relinearize(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check(ct)?;
        match ct.degree() {
            1 => return Ok(ct.clone()),
            2 => {}
            d => {
                return Err(Error::Unsupported(format!(
                    "relinearization of a degree {} ciphertext",
                    d
                )));
            }
        }

        let rlk: &RelinearizationKey = self.rlk.ok_or(Error::MissingRelinearizationKey)?;
        let (r0, r1) = match rlk {
            RelinearizationKey::Hybrid { keys } => self.switch_hybrid(&ct.c[2], ct.level, keys)?,
            RelinearizationKey::Bv { window, keys } => {
                self.switch_bv(&ct.c[2], ct.level, *window, keys)?
            }
        };

        let ring: RingRNS<u64> = self.context.ring_q(ct.level);
        let mut c0: PolyRNS<u64> = ring.new_polyrns();
        let mut c1: PolyRNS<u64> = ring.new_polyrns();
        ring.add::<ONCE>(&ct.c[0], &r0, &mut c0);
        ring.add::<ONCE>(&ct.c[1], &r1, &mut c1);

        Ok(Ciphertext {
            c: vec![c0, c1],
            level: ct.level,
            scale: ct.scale,
            correction: ct.correction,
            len: ct.len,
        })
    }

    /// Divides by the last prime of the ciphertext modulus with rounding and
    /// drops it. [Scheme::Ckks] divides the scale accordingly, [Scheme::Bgv]
    /// preserves the message mod t up to the factor q_level^-1 folded into
    /// the correction.
    pub fn rescale(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        self.check(ct)?;
        if ct.level == 0 {
            return Err(Error::DepthExhausted { level: 0 });
        }

        let params: &Parameters = self.context.params();
        let q_last: u64 = params.q()[ct.level];
        let ring: RingRNS<u64> = self.context.ring_q(ct.level);

        let c: Vec<PolyRNS<u64>> = ct
            .c
            .iter()
            .map(|c| {
                let mut c: PolyRNS<u64> = c.clone();
                ring.div_round_by_last_modulus_ntt_inplace(params.error_multiplier(), &mut c);
                c
            })
            .collect();

        let (scale, correction) = match params.scheme() {
            Scheme::Bgv => {
                let t: u64 = params.plaintext_modulus();
                let q_inv: u64 = inv_mod(q_last % t, t).ok_or_else(|| {
                    Error::InvalidParameters(format!("q={} is not invertible mod t={}", q_last, t))
                })?;
                (ct.scale, mul_mod(ct.correction, q_inv, t))
            }
            Scheme::Ckks => (ct.scale / q_last as f64, ct.correction),
        };

        debug!(
            from = ct.level,
            to = ct.level - 1,
            log_scale = scale.log2(),
            correction,
            "rescaled"
        );

        Ok(Ciphertext {
            c,
            level: ct.level - 1,
            scale,
            correction,
            len: ct.len,
        })
    }

    /// Returns ct at the given level, which must not exceed its own.
    pub fn lower_to(&self, ct: &Ciphertext, level: usize) -> Result<Ciphertext> {
        if level > ct.level {
            return Err(Error::Mismatch(format!(
                "cannot raise a ciphertext from level {} to {}",
                ct.level, level
            )));
        }
        match self.context.params().scheme() {
            Scheme::Ckks => {
                let mut out: Ciphertext = ct.clone();
                out.c.iter_mut().for_each(|c| c.truncate(level));
                out.level = level;
                Ok(out)
            }
            Scheme::Bgv => {
                let mut out: Ciphertext = ct.clone();
                while out.level > level {
                    out = self.rescale(&out)?;
                }
                Ok(out)
            }
        }
    }

    fn add_or_sub(&self, a: &Ciphertext, b: &Ciphertext, sub: bool) -> Result<Ciphertext> {
        self.check(a)?;
        self.check(b)?;

        let level: usize = a.level.min(b.level);
        let a: Ciphertext = self.lower_to(a, level)?;
        let mut b: Ciphertext = self.lower_to(b, level)?;
        let ring: RingRNS<u64> = self.context.ring_q(level);

        match self.context.params().scheme() {
            Scheme::Bgv => {
                if a.correction != b.correction {
                    let t: u64 = self.context.params().plaintext_modulus();
                    let b_inv: u64 = inv_mod(b.correction, t).ok_or_else(|| {
                        Error::Mismatch(format!(
                            "correction {} is not invertible mod t={}",
                            b.correction, t
                        ))
                    })?;
                    let factor: u64 = mul_mod(a.correction, b_inv, t);
                    b.c.iter_mut()
                        .for_each(|c| ring.mul_scalar_inplace::<ONCE>(&factor, c));
                    b.correction = a.correction;
                }
            }
            Scheme::Ckks => {
                if (a.scale - b.scale).abs() > SCALE_TOLERANCE * a.scale.max(b.scale) {
                    return Err(Error::Mismatch(format!(
                        "scales 2^{:.4} and 2^{:.4} differ",
                        a.scale.log2(),
                        b.scale.log2()
                    )));
                }
            }
        }

        let c: Vec<PolyRNS<u64>> = a
            .c
            .iter()
            .zip_longest(b.c.iter())
            .map(|pair| match pair {
                EitherOrBoth::Both(x, y) => {
                    let mut z: PolyRNS<u64> = ring.new_polyrns();
                    if sub {
                        ring.sub::<ONCE>(x, y, &mut z);
                    } else {
                        ring.add::<ONCE>(x, y, &mut z);
                    }
                    z
                }
                EitherOrBoth::Left(x) => x.clone(),
                EitherOrBoth::Right(y) => {
                    let mut z: PolyRNS<u64> = y.clone();
                    if sub {
                        ring.neg_inplace::<ONCE>(&mut z);
                    }
                    z
                }
            })
            .collect();

        Ok(Ciphertext {
            c,
            level,
            scale: a.scale,
            correction: a.correction,
            len: a.len.max(b.len),
        })
    }

    /// Hybrid key switching of d2 (NTT domain, primes q_0..q_level): each CRT
    /// limb is lifted to Q_level * P, multiplied with its key, and the sum is
    /// divided by P.
    fn switch_hybrid(
        &self,
        d2: &PolyRNS<u64>,
        level: usize,
        keys: &[[PolyRNS<u64>; 2]],
    ) -> Result<(PolyRNS<u64>, PolyRNS<u64>)> {
        let special: usize = self.context.ring_qp().level();
        if self.context.params().p().is_none()
            || keys.len() != self.context.max_level() + 1
            || keys.iter().any(|k| k[0].level() != special)
        {
            return Err(Error::Mismatch(
                "relinearization key does not belong to this context".into(),
            ));
        }

        let ring_q: RingRNS<u64> = self.context.ring_q(level);
        let ring_qp: RingRNS<u64> = self.context.ring_q_level_p(level);

        let mut acc0: PolyRNS<u64> = ring_qp.new_polyrns();
        let mut acc1: PolyRNS<u64> = ring_qp.new_polyrns();
        let mut limb: Poly<u64> = ring_qp.new_poly();
        let mut lifted: Poly<u64> = ring_qp.new_poly();
        let mut lifted_mont: Poly<u64> = ring_qp.new_poly();

        ring_q.0.iter().enumerate().for_each(|(i, ring_i)| {
            ring_i.intt(d2.at(i), &mut limb);
            ring_qp.0.iter().enumerate().for_each(|(j, ring_j)| {
                // The key stores P after q_L.
                let key_j: usize = if j <= level { j } else { special };
                ring_j.from_centered(&limb, ring_i.modulus.q(), &mut lifted);
                ring_j.ntt_inplace(&mut lifted);
                ring_j.prepare_montgomery::<ONCE>(&lifted, &mut lifted_mont);
                ring_j.mul_montgomery_external_add_inplace::<ONCE>(
                    &lifted_mont,
                    keys[i][0].at(key_j),
                    acc0.at_mut(j),
                );
                ring_j.mul_montgomery_external_add_inplace::<ONCE>(
                    &lifted_mont,
                    keys[i][1].at(key_j),
                    acc1.at_mut(j),
                );
            });
        });

        let t: u64 = self.context.params().error_multiplier();
        ring_qp.div_round_by_last_modulus_ntt_inplace(t, &mut acc0);
        ring_qp.div_round_by_last_modulus_ntt_inplace(t, &mut acc1);

        Ok((acc0, acc1))
    }

    /// BV key switching of d2: each CRT limb is split into base 2^window
    /// digits, each multiplied with its key over Q_level.
    fn switch_bv(
        &self,
        d2: &PolyRNS<u64>,
        level: usize,
        window: u32,
        keys: &[Vec<[PolyRNS<u64>; 2]>],
    ) -> Result<(PolyRNS<u64>, PolyRNS<u64>)> {
        if keys.len() != self.context.max_level() + 1
            || keys
                .iter()
                .flatten()
                .any(|k| k[0].level() != self.context.max_level())
        {
            return Err(Error::Mismatch(
                "relinearization key does not belong to this context".into(),
            ));
        }

        let ring: RingRNS<u64> = self.context.ring_q(level);
        let mask: u64 = match window {
            0 => u64::MAX,
            w => (1u64 << w) - 1,
        };

        let mut acc0: PolyRNS<u64> = ring.new_polyrns();
        let mut acc1: PolyRNS<u64> = ring.new_polyrns();
        let mut limb: Poly<u64> = ring.new_poly();
        let mut digit: Poly<u64> = ring.new_poly();
        let mut reduced: Poly<u64> = ring.new_poly();
        let mut reduced_mont: Poly<u64> = ring.new_poly();

        ring.0.iter().enumerate().for_each(|(i, ring_i)| {
            ring_i.intt(d2.at(i), &mut limb);
            keys[i].iter().enumerate().for_each(|(k, key)| {
                ring_i.digit(&limb, window as usize * k, mask, &mut digit);
                ring.0.iter().enumerate().for_each(|(j, ring_j)| {
                    ring_j.reduce(&digit, &mut reduced);
                    ring_j.ntt_inplace(&mut reduced);
                    ring_j.prepare_montgomery::<ONCE>(&reduced, &mut reduced_mont);
                    ring_j.mul_montgomery_external_add_inplace::<ONCE>(
                        &reduced_mont,
                        key[0].at(j),
                        acc0.at_mut(j),
                    );
                    ring_j.mul_montgomery_external_add_inplace::<ONCE>(
                        &reduced_mont,
                        key[1].at(j),
                        acc1.at_mut(j),
                    );
                });
            });
        });

        Ok((acc0, acc1))
    }

    fn correction_product(&self, a: u64, b: u64) -> u64 {
        match self.context.params().scheme() {
            Scheme::Bgv => mul_mod(a, b, self.context.params().plaintext_modulus()),
            Scheme::Ckks => 1,
        }
    }

    fn check(&self, ct: &Ciphertext) -> Result<()> {
        if ct.level > self.context.max_level()
            || ct.c.len() < 2
            || ct.c.iter().any(|c| c.level() != ct.level || c.n() != self.context.n())
        {
            return Err(Error::Mismatch(format!(
                "ciphertext at level {} of degree {} does not belong to this context",
                ct.level,
                ct.c.len().saturating_sub(1)
            )));
        }
        Ok(())
    }
}
