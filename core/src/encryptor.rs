use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::keys::PublicKey;
use crate::plaintext::Plaintext;
use hedist_backend::modulus::ONCE;
use hedist_backend::poly::PolyRNS;
use hedist_backend::ring::RingRNS;
use hedist_sampling::distributions::Distributions;
use hedist_sampling::source::Source;

/// Public-key encryption at the top of the modulus chain.
pub struct Encryptor<'a> {
    context: &'a Context,
    pk: &'a PublicKey,
}

impl<'a> Encryptor<'a> {
    pub fn new(context: &'a Context, pk: &'a PublicKey) -> Self {
        Self { context, pk }
    }

    /// Returns (b*u + t*e_0 + m, a*u + t*e_1) with u ternary.
    pub fn encrypt(&self, pt: &Plaintext, source: &mut Source) -> Result<Ciphertext> {
        let level: usize = self.context.max_level();
        let ring: RingRNS<u64> = self.context.ring_q(level);

        if pt.coeffs.len() != ring.n() {
            return Err(Error::Encoding(format!(
                "plaintext has {} coefficients, expected N={}",
                pt.coeffs.len(),
                ring.n()
            )));
        }
        if self.pk.b.level() != level || self.pk.b.n() != ring.n() {
            return Err(Error::Mismatch(
                "public key does not belong to this context".into(),
            ));
        }

        let dist: Distributions = Distributions::gaussian(self.context.params().sigma())
            .map_err(|e| Error::InvalidParameters(e.to_string()))?;
        let t: u64 = self.context.params().error_multiplier();

        let (_, mut source_xu) = source.branch();
        let (_, mut source_xe) = source.branch();

        let mut u: PolyRNS<u64> = ring.new_polyrns();
        ring.fill_dist(&mut source_xu, &Distributions::Ternary, &mut u);
        ring.ntt_inplace(&mut u);
        let mut u_mont: PolyRNS<u64> = ring.new_polyrns();
        ring.prepare_montgomery::<ONCE>(&u, &mut u_mont);

        let mut m: PolyRNS<u64> = ring.new_polyrns();
        ring.from_bigint_inplace(&pt.coeffs, &mut m);
        ring.ntt_inplace(&mut m);

        let mut c0: PolyRNS<u64> = sample_error_ntt(&ring, &dist, t, &mut source_xe);
        ring.mul_montgomery_external_add_inplace::<ONCE>(&u_mont, &self.pk.b, &mut c0);
        ring.add_inplace::<ONCE>(&m, &mut c0);

        let mut c1: PolyRNS<u64> = sample_error_ntt(&ring, &dist, t, &mut source_xe);
        ring.mul_montgomery_external_add_inplace::<ONCE>(&u_mont, &self.pk.a, &mut c1);

        Ok(Ciphertext {
            c: vec![c0, c1],
            level,
            scale: pt.scale,
            correction: 1,
            len: pt.len,
        })
    }
}

/// Returns t * e in the NTT domain, e drawn from dist.
pub(crate) fn sample_error_ntt(
    ring: &RingRNS<u64>,
    dist: &Distributions,
    t: u64,
    source: &mut Source,
) -> PolyRNS<u64> {
    let mut e: Vec<i64> = vec![0; ring.n()];
    dist.fill(source, &mut e);
    let scaled: Vec<i128> = e.iter().map(|e| *e as i128 * t as i128).collect();
    let mut poly: PolyRNS<u64> = ring.new_polyrns();
    ring.from_i128_inplace(&scaled, &mut poly);
    ring.ntt_inplace(&mut poly);
    poly
}
