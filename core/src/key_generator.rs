use crate::context::Context;
use crate::encryptor::sample_error_ntt;
use crate::error::{Error, Result};
use crate::keys::{PublicKey, RelinearizationKey, SecretKey};
use crate::parameters::KeySwitching;
use hedist_backend::modulus::ONCE;
use hedist_backend::poly::{Poly, PolyRNS};
use hedist_backend::ring::RingRNS;
use hedist_sampling::distributions::Distributions;
use hedist_sampling::source::Source;
use tracing::debug;

pub struct KeyGenerator<'a> {
    context: &'a Context,
}

impl<'a> KeyGenerator<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context }
    }

    pub fn gen_secret_key(&self, source: &mut Source) -> SecretKey {
        let ring: &RingRNS<u64> = self.context.ring_qp();
        let mut s: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_dist(source, &Distributions::Ternary, &mut s);
        ring.ntt_inplace(&mut s);
        let mut s_mont: PolyRNS<u64> = ring.new_polyrns();
        ring.prepare_montgomery::<ONCE>(&s, &mut s_mont);
        SecretKey { s, s_mont }
    }

    pub fn gen_public_key(&self, sk: &SecretKey, source: &mut Source) -> Result<PublicKey> {
        self.check_secret_key(sk)?;
        let ring: RingRNS<u64> = self.context.ring_q(self.context.max_level());
        let [b, a] = self.encrypt_zero(&ring, sk, source)?;
        Ok(PublicKey { b, a })
    }

    pub fn gen_relinearization_key(
        &self,
        sk: &SecretKey,
        source: &mut Source,
    ) -> Result<RelinearizationKey> {
        self.check_secret_key(sk)?;

        let max_level: usize = self.context.max_level();
        let ring_q: RingRNS<u64> = self.context.ring_q(max_level);

        // s^2 mod q_i, one limb per prime of Q.
        let mut s2: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.mul_montgomery_external::<ONCE>(&sk.s_mont, &sk.s, &mut s2);

        let rlk: RelinearizationKey = match self.context.params().key_switching() {
            KeySwitching::Hybrid => {
                let p: u64 = self.context.params().p().ok_or_else(|| {
                    Error::KeyGeneration("hybrid key switching without special prime".into())
                })?;
                let ring_qp: &RingRNS<u64> = self.context.ring_qp();
                let keys: Vec<[PolyRNS<u64>; 2]> = (0..=max_level)
                    .map(|i| {
                        let mut key: [PolyRNS<u64>; 2] = self.encrypt_zero(ring_qp, sk, source)?;
                        add_scaled_limb(&ring_q, i, p, &s2, &mut key[0]);
                        Ok(key)
                    })
                    .collect::<Result<_>>()?;
                RelinearizationKey::Hybrid { keys }
            }
            KeySwitching::Bv { window } => {
                let keys: Vec<Vec<[PolyRNS<u64>; 2]>> = ring_q
                    .moduli()
                    .iter()
                    .enumerate()
                    .map(|(i, q)| {
                        (0..bv_digits(*q, window))
                            .map(|k| {
                                let mut key: [PolyRNS<u64>; 2] =
                                    self.encrypt_zero(&ring_q, sk, source)?;
                                add_scaled_limb(&ring_q, i, 1u64 << (window as usize * k), &s2, &mut key[0]);
                                Ok(key)
                            })
                            .collect::<Result<_>>()
                    })
                    .collect::<Result<_>>()?;
                RelinearizationKey::Bv { window, keys }
            }
        };

        debug!(keys = rlk.count(), "relinearization key ready");

        Ok(rlk)
    }

    fn check_secret_key(&self, sk: &SecretKey) -> Result<()> {
        let ring: &RingRNS<u64> = self.context.ring_qp();
        if sk.s.level() != ring.level() || sk.s.n() != ring.n() {
            return Err(Error::KeyGeneration(format!(
                "secret key with {} primes and N={} does not belong to a context with {} primes and N={}",
                sk.s.level() + 1,
                sk.s.n(),
                ring.level() + 1,
                ring.n()
            )));
        }
        Ok(())
    }

    /// Returns [b, a] = [-a*s + t*e, a] over ring, a uniform.
    fn encrypt_zero(
        &self,
        ring: &RingRNS<u64>,
        sk: &SecretKey,
        source: &mut Source,
    ) -> Result<[PolyRNS<u64>; 2]> {
        let dist: Distributions = Distributions::gaussian(self.context.params().sigma())
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;

        let (_, mut source_xa) = source.branch();
        let (_, mut source_xe) = source.branch();

        let mut a: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_uniform(&mut source_xa, &mut a);

        let mut b: PolyRNS<u64> = ring.new_polyrns();
        ring.mul_montgomery_external::<ONCE>(&sk.s_mont, &a, &mut b);
        ring.neg_inplace::<ONCE>(&mut b);

        let e: PolyRNS<u64> = sample_error_ntt(
            ring,
            &dist,
            self.context.params().error_multiplier(),
            &mut source_xe,
        );
        ring.add_inplace::<ONCE>(&e, &mut b);

        Ok([b, a])
    }
}

/// Number of base 2^window digits of a residue mod q.
pub(crate) fn bv_digits(q: u64, window: u32) -> usize {
    let bits: usize = (u64::BITS - q.leading_zeros()) as usize;
    match window {
        0 => 1,
        w => bits.div_ceil(w as usize),
    }
}

/// b_i <- b_i + factor * s2_i on the limb i only.
fn add_scaled_limb(ring_q: &RingRNS<u64>, i: usize, factor: u64, s2: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
    let ring = &ring_q.0[i];
    let mut tmp: Poly<u64> = ring.new_poly();
    tmp.copy_from(s2.at(i));
    ring.mul_scalar_inplace::<ONCE>(&factor, &mut tmp);
    ring.add_inplace::<ONCE>(&tmp, b.at_mut(i));
}
