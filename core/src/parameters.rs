use crate::error::{Error, Result};
use crate::security::SecurityLevel;
use hedist_backend::modulus::prime::Prime;
use hedist_backend::modulus::prime_generation::NTTFriendlyPrimesGenerator;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest bit size of a generated prime.
pub const MAX_PRIME_BITS: u32 = 61;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// Exact arithmetic modulo a plaintext modulus t.
    Bgv,
    /// Approximate arithmetic on scaled complex vectors.
    Ckks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeySwitching {
    /// One special prime P; the gadget is the CRT basis of Q.
    Hybrid,
    /// Base 2^window digits of each CRT limb, no special prime.
    /// A window of 0 takes each limb as a single digit.
    Bv { window: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModulusChain {
    /// Primes generated from their bit sizes, `data[0]` being the base prime.
    Bits { data: Vec<u32>, special: Option<u32> },
    /// Explicit NTT-friendly primes.
    Primes { data: Vec<u64>, special: Option<u64> },
}

/// User-facing description of a parameter set, resolved into [Parameters]
/// by [Parameters::new].
#[derive(Clone, Debug, PartialEq)]
pub struct ParametersLiteral {
    pub scheme: Scheme,
    /// Plaintext modulus t, ignored by [Scheme::Ckks].
    pub plaintext_modulus: u64,
    /// Ring degree N; derived from the security level when None.
    pub ring_degree: Option<usize>,
    pub chain: ModulusChain,
    /// Whether multiplications consume the modulus chain.
    pub leveled: bool,
    pub key_switching: KeySwitching,
    pub security: SecurityLevel,
    /// Standard deviation of the error distribution.
    pub sigma: f64,
    /// Default encoding scale of [Scheme::Ckks], the power of two closest to the
    /// last data prime when None.
    pub scale: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameters {
    scheme: Scheme,
    n: usize,
    plaintext_modulus: u64,
    q: Vec<u64>,
    p: Option<u64>,
    leveled: bool,
    key_switching: KeySwitching,
    security: SecurityLevel,
    sigma: f64,
    scale: f64,
}

impl Parameters {
    pub fn new(literal: &ParametersLiteral) -> Result<Self> {
        validate(literal)?;

        let mut n: usize = match literal.ring_degree {
            Some(n) => n,
            None => literal
                .security
                .min_ring_degree(estimated_log_qp(&literal.chain))
                .ok_or_else(|| {
                    Error::InvalidParameters(format!(
                        "no ring degree up to {} supports log2(QP)={} at {:?}",
                        SecurityLevel::max_ring_degree(),
                        estimated_log_qp(&literal.chain),
                        literal.security
                    ))
                })?,
        };

        loop {
            let (q, p) = resolve_chain(&literal.chain, n)?;

            let log_qp: usize = log_qp(&q, p);

            if let Some(max) = literal.security.max_log_qp(n) {
                if log_qp > max {
                    if literal.ring_degree.is_none() && n < SecurityLevel::max_ring_degree() {
                        n <<= 1;
                        continue;
                    }
                    return Err(Error::InvalidParameters(format!(
                        "log2(QP)={} exceeds the {} bits allowed for N={} at {:?}",
                        log_qp, max, n, literal.security
                    )));
                }
            }

            if literal.scheme == Scheme::Bgv {
                let t: u64 = literal.plaintext_modulus;
                if let Some(q) = q.iter().chain(p.iter()).find(|q| **q <= t) {
                    return Err(Error::InvalidParameters(format!(
                        "plaintext modulus t={} is not smaller than the prime {}",
                        t, q
                    )));
                }
            }

            let scale: f64 = match literal.scheme {
                Scheme::Bgv => 1.0,
                Scheme::Ckks => literal
                    .scale
                    .unwrap_or_else(|| 2f64.powi((q[q.len() - 1] as f64).log2().round() as i32)),
            };

            return Ok(Self {
                scheme: literal.scheme,
                n,
                plaintext_modulus: match literal.scheme {
                    Scheme::Bgv => literal.plaintext_modulus,
                    Scheme::Ckks => 1,
                },
                q,
                p,
                leveled: literal.leveled,
                key_switching: literal.key_switching,
                security: literal.security,
                sigma: literal.sigma,
                scale,
            });
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Plaintext modulus t, 1 for [Scheme::Ckks].
    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Factor applied to every fresh error term: t for BGV, 1 for CKKS.
    pub fn error_multiplier(&self) -> u64 {
        self.plaintext_modulus
    }

    pub fn q(&self) -> &[u64] {
        &self.q
    }

    pub fn p(&self) -> Option<u64> {
        self.p
    }

    pub fn max_level(&self) -> usize {
        self.q.len() - 1
    }

    pub fn leveled(&self) -> bool {
        self.leveled
    }

    pub fn key_switching(&self) -> KeySwitching {
        self.key_switching
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Bit size of Q * P.
    pub fn log_qp(&self) -> usize {
        log_qp(&self.q, self.p)
    }
}

fn validate(literal: &ParametersLiteral) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidParameters(msg));

    if literal.scheme == Scheme::Bgv && literal.plaintext_modulus < 2 {
        return invalid(format!(
            "plaintext modulus t={} must be at least 2",
            literal.plaintext_modulus
        ));
    }

    if let Some(n) = literal.ring_degree {
        if !n.is_power_of_two() || n < 2 {
            return invalid(format!("ring degree N={} is not a power of two >= 2", n));
        }
    } else if literal.security == SecurityLevel::NotSet {
        return invalid("ring degree must be given when the security level is not set".into());
    }

    if !literal.sigma.is_finite() || literal.sigma <= 0.0 {
        return invalid(format!("sigma={} must be finite and positive", literal.sigma));
    }

    if let Some(scale) = literal.scale {
        if !scale.is_finite() || scale <= 1.0 {
            return invalid(format!("scale={} must be finite and > 1", scale));
        }
    }

    let (data_len, has_special) = match &literal.chain {
        ModulusChain::Bits { data, special } => {
            if let Some(bits) = data
                .iter()
                .chain(special.iter())
                .find(|bits| !(2..=MAX_PRIME_BITS).contains(*bits))
            {
                return invalid(format!("prime bit size {} not in [2, {}]", bits, MAX_PRIME_BITS));
            }
            (data.len(), special.is_some())
        }
        ModulusChain::Primes { data, special } => (data.len(), special.is_some()),
    };

    if data_len == 0 {
        return invalid("the modulus chain holds no data prime".into());
    }

    match (literal.key_switching, has_special) {
        (KeySwitching::Hybrid, false) => invalid("hybrid key switching needs a special prime".into()),
        (KeySwitching::Bv { .. }, true) => {
            invalid("BV key switching does not use a special prime".into())
        }
        (KeySwitching::Bv { window }, false) if window > MAX_PRIME_BITS => {
            invalid(format!("relinearization window {} > {}", window, MAX_PRIME_BITS))
        }
        _ => Ok(()),
    }
}

fn estimated_log_qp(chain: &ModulusChain) -> usize {
    match chain {
        ModulusChain::Bits { data, special } => {
            data.iter().chain(special.iter()).map(|b| *b as usize).sum()
        }
        ModulusChain::Primes { data, special } => log_qp(data, *special),
    }
}

fn log_qp(q: &[u64], p: Option<u64>) -> usize {
    q.iter()
        .chain(p.iter())
        .fold(BigInt::from(1u64), |acc, q| acc * BigInt::from(*q))
        .bits() as usize
}

/// Returns the data primes and the special prime for ring degree n.
fn resolve_chain(chain: &ModulusChain, n: usize) -> Result<(Vec<u64>, Option<u64>)> {
    let nth_root: u64 = (n as u64) << 1;
    match chain {
        ModulusChain::Bits { data, special } => {
            let mut generators: BTreeMap<u32, NTTFriendlyPrimesGenerator> = BTreeMap::new();
            let mut next = |bits: u32| -> Result<u64> {
                generators
                    .entry(bits)
                    .or_insert_with(|| NTTFriendlyPrimesGenerator::new(bits, nth_root))
                    .next_alternating_prime()
                    .ok_or_else(|| {
                        Error::InvalidParameters(format!(
                            "not enough {}-bit primes q = 1 mod {}",
                            bits, nth_root
                        ))
                    })
            };
            let q: Vec<u64> = data.iter().map(|bits| next(*bits)).collect::<Result<_>>()?;
            let p: Option<u64> = special.map(&mut next).transpose()?;
            Ok((q, p))
        }
        ModulusChain::Primes { data, special } => {
            let primes: Vec<u64> = data.iter().chain(special.iter()).copied().collect();
            if let Some(q) = primes.iter().find(|q| !Prime::is_ntt_friendly(**q, nth_root)) {
                return Err(Error::InvalidParameters(format!(
                    "q={} is not a prime below 2^{} with q = 1 mod {}",
                    q, MAX_PRIME_BITS, nth_root
                )));
            }
            let mut sorted: Vec<u64> = primes.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != primes.len() {
                return Err(Error::InvalidParameters("the modulus chain repeats a prime".into()));
            }
            Ok((data.clone(), *special))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgvrns(ring_degree: Option<usize>, depth: usize) -> ParametersLiteral {
        ParametersLiteral {
            scheme: Scheme::Bgv,
            plaintext_modulus: 65537,
            ring_degree,
            chain: ModulusChain::Bits {
                data: vec![60; depth + 1],
                special: Some(60),
            },
            leveled: true,
            key_switching: KeySwitching::Hybrid,
            security: SecurityLevel::Classic128,
            sigma: 3.19,
            scale: None,
        }
    }

    #[test]
    fn ring_degree_is_derived_from_security() {
        let params: Parameters = Parameters::new(&bgvrns(None, 3)).unwrap();
        assert_eq!(params.n(), 16384);
        assert_eq!(params.q().len(), 4);
        assert!(params.p().is_some());
        assert!(params.log_qp() <= 438);
    }

    #[test]
    fn explicit_ring_degree_too_small_is_rejected() {
        assert!(matches!(
            Parameters::new(&bgvrns(Some(4096), 3)),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn primes_are_distinct_and_ntt_friendly() {
        let params: Parameters = Parameters::new(&bgvrns(Some(8192), 1)).unwrap();
        let mut primes: Vec<u64> = params.q().to_vec();
        primes.extend(params.p());
        primes
            .iter()
            .for_each(|q| assert!(Prime::is_ntt_friendly(*q, 2 * 8192)));
        primes.sort_unstable();
        primes.dedup();
        assert_eq!(primes.len(), 3);
    }

    #[test]
    fn explicit_modulus_must_be_ntt_friendly() {
        let mut literal: ParametersLiteral = bgvrns(Some(1 << 16), 0);
        literal.security = SecurityLevel::NotSet;
        literal.key_switching = KeySwitching::Bv { window: 1 };
        literal.leveled = false;
        literal.chain = ModulusChain::Primes {
            data: vec![1073872897],
            special: None,
        };
        assert!(Parameters::new(&literal).is_ok());
        literal.chain = ModulusChain::Primes {
            data: vec![1073872899],
            special: None,
        };
        assert!(matches!(
            Parameters::new(&literal),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn not_set_security_requires_ring_degree() {
        let mut literal: ParametersLiteral = bgvrns(None, 1);
        literal.security = SecurityLevel::NotSet;
        assert!(matches!(
            Parameters::new(&literal),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn ckks_default_scale_follows_last_data_prime() {
        let literal: ParametersLiteral = ParametersLiteral {
            scheme: Scheme::Ckks,
            plaintext_modulus: 0,
            ring_degree: Some(8192),
            chain: ModulusChain::Bits {
                data: vec![60, 40, 40],
                special: Some(60),
            },
            leveled: true,
            key_switching: KeySwitching::Hybrid,
            security: SecurityLevel::Classic128,
            sigma: 3.19,
            scale: None,
        };
        let params: Parameters = Parameters::new(&literal).unwrap();
        assert_eq!(params.plaintext_modulus(), 1);
        assert_eq!(params.scale(), 2f64.powi(40));
    }
}
