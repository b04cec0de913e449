use crate::engine::HeEngine;
use crate::error::{HarnessError, Result};
use hedist_core::parameters::MAX_PRIME_BITS;
use hedist_core::{KeySwitching, ModulusChain, ParametersLiteral, Scheme, SecurityLevel};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Largest ring dimension the harness will allocate. Larger dimensions are
/// reported as [HarnessError::Unsupported], not as invalid parameters.
pub const MAX_RING_DIMENSION: usize = 1 << 17;

/// Bit size of the base prime and of the key-switching prime of generated
/// chains.
pub const WIDE_PRIME_BITS: u32 = 60;

/// Noise deviation of the forms that do not name one.
pub const DEFAULT_SIGMA: f64 = 3.19;

/// How a descriptor was specified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionForm {
    /// The ring dimension and moduli follow from a security level and a depth.
    SecurityDriven,
    /// Every numeric parameter is given; no security bound is enforced
    /// beyond what the form itself states.
    Explicit,
}

/// One scheme configuration of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeDescriptor {
    BgvRns(BgvRnsParams),
    Bgv(BgvParams),
    Ckks(CkksParams),
}

/// Integer scheme over an RNS modulus chain of 60-bit primes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BgvRnsParams {
    pub plaintext_modulus: u64,
    /// 0 lets the engine derive it from the security level.
    pub ring_dimension: usize,
    pub depth: usize,
    pub security: SecurityLevel,
    pub sigma: f64,
    /// Highest ciphertext degree reached before relinearization.
    pub max_relin_degree: u32,
    pub key_switching: KeySwitching,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BgvModulus {
    /// Modulus of the given bit size, split over as few word-size primes as possible.
    Bits(u32),
    /// Decimal modulus, which must be an NTT-friendly prime.
    Explicit(String),
}

/// Integer scheme over a single modulus that multiplications do not consume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BgvParams {
    pub plaintext_modulus: u64,
    /// Twice the ring dimension.
    pub cyclotomic_order: usize,
    pub modulus: BgvModulus,
    /// Bits per relinearization digit.
    pub relin_window: u32,
    pub std_dev: f64,
}

/// Whether products are rescaled as they are computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rescaling {
    /// Every product is divided by the last prime of the chain.
    Exact,
    /// Products keep the squared scale and the chain is never consumed.
    Deferred,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CkksParams {
    /// Depth and scale with the ring dimension derived from the security level.
    SecurityDriven {
        depth: usize,
        scale_bits: u32,
        batch_size: usize,
        security: SecurityLevel,
        /// 0 lets the engine derive it.
        ring_dimension: usize,
        rescaling: Rescaling,
    },
    /// `primes` primes of `scale_bits` bits with digit relinearization.
    Explicit {
        cyclotomic_order: usize,
        primes: usize,
        scale_bits: u32,
        relin_window: u32,
        batch_size: usize,
    },
    /// Bit sizes of the whole chain; the last entry is the key-switching prime.
    /// The chain is checked against `security`, which defaults to 128 bits
    /// when a table omits it.
    Chain {
        ring_dimension: usize,
        chain_bits: Vec<u32>,
        scale: f64,
        #[serde(default)]
        security: SecurityLevel,
    },
}

impl SchemeDescriptor {
    pub fn scheme_name(&self) -> &'static str {
        match self {
            SchemeDescriptor::BgvRns(_) => "BGVrns",
            SchemeDescriptor::Bgv(_) => "BGV",
            SchemeDescriptor::Ckks(_) => "CKKS",
        }
    }

    pub fn form(&self) -> ConstructionForm {
        match self {
            SchemeDescriptor::BgvRns(_) => ConstructionForm::SecurityDriven,
            SchemeDescriptor::Bgv(_) => ConstructionForm::Explicit,
            SchemeDescriptor::Ckks(CkksParams::SecurityDriven { .. }) => {
                ConstructionForm::SecurityDriven
            }
            SchemeDescriptor::Ckks(_) => ConstructionForm::Explicit,
        }
    }

    /// Checks the internal consistency of the descriptor.
    pub fn validate(&self) -> Result<()> {
        match self {
            SchemeDescriptor::BgvRns(p) => {
                check_plaintext_modulus(p.plaintext_modulus)?;
                check_optional_ring_dimension(p.ring_dimension)?;
                check_deviation("sigma", p.sigma)?;
                if p.max_relin_degree != 2 {
                    return invalid(format!(
                        "relinearization from degree {} is not supported, only from degree 2",
                        p.max_relin_degree
                    ));
                }
                if let KeySwitching::Bv { window } = p.key_switching {
                    check_window(window)?;
                }
                Ok(())
            }
            SchemeDescriptor::Bgv(p) => {
                check_plaintext_modulus(p.plaintext_modulus)?;
                check_ring_dimension(ring_dimension_of(p.cyclotomic_order)?)?;
                check_window(p.relin_window)?;
                check_deviation("standard deviation", p.std_dev)?;
                match &p.modulus {
                    BgvModulus::Bits(bits) if *bits < 2 => {
                        invalid(format!("modulus of {} bits", bits))
                    }
                    BgvModulus::Bits(_) => Ok(()),
                    BgvModulus::Explicit(q) => parse_modulus(q).map(|_| ()),
                }
            }
            SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
                scale_bits,
                batch_size,
                ring_dimension,
                ..
            }) => {
                check_prime_bits("scale", *scale_bits)?;
                check_optional_ring_dimension(*ring_dimension)?;
                check_batch_size(*batch_size, *ring_dimension)
            }
            SchemeDescriptor::Ckks(CkksParams::Explicit {
                cyclotomic_order,
                primes,
                scale_bits,
                relin_window,
                batch_size,
            }) => {
                let n: usize = ring_dimension_of(*cyclotomic_order)?;
                check_ring_dimension(n)?;
                if *primes == 0 {
                    return invalid("the modulus chain needs at least one prime".into());
                }
                check_prime_bits("scale", *scale_bits)?;
                check_window(*relin_window)?;
                check_batch_size(*batch_size, n)
            }
            SchemeDescriptor::Ckks(CkksParams::Chain {
                ring_dimension,
                chain_bits,
                scale,
                ..
            }) => {
                check_ring_dimension(*ring_dimension)?;
                if chain_bits.len() < 2 {
                    return invalid(format!(
                        "a chain of {} primes has no data prime besides the key-switching prime",
                        chain_bits.len()
                    ));
                }
                chain_bits
                    .iter()
                    .try_for_each(|bits| check_prime_bits("prime", *bits))?;
                if !scale.is_finite() || *scale <= 1.0 {
                    return invalid(format!("scale {} must be finite and > 1", scale));
                }
                Ok(())
            }
        }
    }

    /// Engine parameters described by this descriptor.
    pub fn to_literal(&self) -> Result<ParametersLiteral> {
        self.validate()?;
        Ok(match self {
            SchemeDescriptor::BgvRns(p) => ParametersLiteral {
                scheme: Scheme::Bgv,
                plaintext_modulus: p.plaintext_modulus,
                ring_degree: (p.ring_dimension != 0).then_some(p.ring_dimension),
                chain: ModulusChain::Bits {
                    data: vec![WIDE_PRIME_BITS; p.depth + 1],
                    special: match p.key_switching {
                        KeySwitching::Hybrid => Some(WIDE_PRIME_BITS),
                        KeySwitching::Bv { .. } => None,
                    },
                },
                leveled: true,
                key_switching: p.key_switching,
                security: p.security,
                sigma: p.sigma,
                scale: None,
            },
            SchemeDescriptor::Bgv(p) => ParametersLiteral {
                scheme: Scheme::Bgv,
                plaintext_modulus: p.plaintext_modulus,
                ring_degree: Some(ring_dimension_of(p.cyclotomic_order)?),
                chain: match &p.modulus {
                    BgvModulus::Bits(bits) => ModulusChain::Bits {
                        data: split_bits(*bits),
                        special: None,
                    },
                    BgvModulus::Explicit(q) => ModulusChain::Primes {
                        data: vec![parse_modulus(q)?],
                        special: None,
                    },
                },
                leveled: false,
                key_switching: KeySwitching::Bv {
                    window: p.relin_window,
                },
                security: SecurityLevel::NotSet,
                sigma: p.std_dev,
                scale: None,
            },
            SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
                depth,
                scale_bits,
                security,
                ring_dimension,
                rescaling,
                ..
            }) => ParametersLiteral {
                scheme: Scheme::Ckks,
                plaintext_modulus: 0,
                ring_degree: (*ring_dimension != 0).then_some(*ring_dimension),
                chain: ModulusChain::Bits {
                    data: std::iter::once(WIDE_PRIME_BITS)
                        .chain(std::iter::repeat_n(*scale_bits, *depth))
                        .collect(),
                    special: Some(WIDE_PRIME_BITS),
                },
                leveled: *rescaling == Rescaling::Exact,
                key_switching: KeySwitching::Hybrid,
                security: *security,
                sigma: DEFAULT_SIGMA,
                scale: Some(2f64.powi(*scale_bits as i32)),
            },
            SchemeDescriptor::Ckks(CkksParams::Explicit {
                cyclotomic_order,
                primes,
                scale_bits,
                relin_window,
                ..
            }) => ParametersLiteral {
                scheme: Scheme::Ckks,
                plaintext_modulus: 0,
                ring_degree: Some(ring_dimension_of(*cyclotomic_order)?),
                chain: ModulusChain::Bits {
                    data: vec![*scale_bits; *primes],
                    special: None,
                },
                leveled: true,
                key_switching: KeySwitching::Bv {
                    window: *relin_window,
                },
                security: SecurityLevel::NotSet,
                sigma: DEFAULT_SIGMA,
                scale: Some(2f64.powi(*scale_bits as i32)),
            },
            SchemeDescriptor::Ckks(CkksParams::Chain {
                ring_dimension,
                chain_bits,
                scale,
                security,
            }) => {
                let (special, data) = chain_bits
                    .split_last()
                    .ok_or_else(|| HarnessError::ParameterValidation("empty chain".into()))?;
                ParametersLiteral {
                    scheme: Scheme::Ckks,
                    plaintext_modulus: 0,
                    ring_degree: Some(*ring_dimension),
                    chain: ModulusChain::Bits {
                        data: data.to_vec(),
                        special: Some(*special),
                    },
                    leveled: true,
                    key_switching: KeySwitching::Hybrid,
                    security: *security,
                    sigma: DEFAULT_SIGMA,
                    scale: Some(*scale),
                }
            }
        })
    }

    /// Validates the descriptor and asks the engine for its context.
    pub fn generate_context<E: HeEngine>(&self, engine: &E) -> Result<E::Context> {
        engine.generate_context(&self.to_literal()?)
    }

    /// One-line summary of the declared parameters.
    pub fn describe(&self) -> String {
        match self {
            SchemeDescriptor::BgvRns(p) => format!(
                "BGVrns t={} N={} depth={} security={:?} sigma={} ks={:?}",
                p.plaintext_modulus,
                dimension_label(p.ring_dimension),
                p.depth,
                p.security,
                p.sigma,
                p.key_switching
            ),
            SchemeDescriptor::Bgv(p) => format!(
                "BGV t={} m={} q={} window={} sigma={}",
                p.plaintext_modulus,
                p.cyclotomic_order,
                match &p.modulus {
                    BgvModulus::Bits(bits) => format!("{} bits", bits),
                    BgvModulus::Explicit(q) => q.clone(),
                },
                p.relin_window,
                p.std_dev
            ),
            SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
                depth,
                scale_bits,
                batch_size,
                security,
                ring_dimension,
                rescaling,
            }) => format!(
                "CKKS N={} depth={} scale=2^{} batch={} security={:?} rescaling={:?}",
                dimension_label(*ring_dimension),
                depth,
                scale_bits,
                batch_size,
                security,
                rescaling
            ),
            SchemeDescriptor::Ckks(CkksParams::Explicit {
                cyclotomic_order,
                primes,
                scale_bits,
                relin_window,
                batch_size,
            }) => format!(
                "CKKS m={} primes={} scale=2^{} window={} batch={}",
                cyclotomic_order, primes, scale_bits, relin_window, batch_size
            ),
            SchemeDescriptor::Ckks(CkksParams::Chain {
                ring_dimension,
                chain_bits,
                scale,
                security,
            }) => format!(
                "CKKS N={} chain={:?} scale=2^{:.2} security={:?}",
                ring_dimension,
                chain_bits,
                scale.log2(),
                security
            ),
        }
    }
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(HarnessError::ParameterValidation(msg))
}

fn dimension_label(n: usize) -> String {
    match n {
        0 => "derived".into(),
        n => n.to_string(),
    }
}

fn check_plaintext_modulus(t: u64) -> Result<()> {
    if t < 2 {
        return invalid(format!("plaintext modulus {} must be at least 2", t));
    }
    Ok(())
}

fn check_ring_dimension(n: usize) -> Result<()> {
    if !n.is_power_of_two() || n < 2 {
        return invalid(format!("ring dimension {} is not a power of two >= 2", n));
    }
    if n > MAX_RING_DIMENSION {
        return Err(HarnessError::Unsupported(format!(
            "ring dimension {} exceeds the largest supported dimension {}",
            n, MAX_RING_DIMENSION
        )));
    }
    Ok(())
}

fn check_optional_ring_dimension(n: usize) -> Result<()> {
    match n {
        0 => Ok(()),
        n => check_ring_dimension(n),
    }
}

fn ring_dimension_of(cyclotomic_order: usize) -> Result<usize> {
    if !cyclotomic_order.is_power_of_two() || cyclotomic_order < 4 {
        return invalid(format!(
            "cyclotomic order {} is not a power of two >= 4",
            cyclotomic_order
        ));
    }
    Ok(cyclotomic_order >> 1)
}

fn check_deviation(name: &str, sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return invalid(format!("{} {} must be finite and positive", name, sigma));
    }
    Ok(())
}

fn check_prime_bits(name: &str, bits: u32) -> Result<()> {
    if !(2..=MAX_PRIME_BITS).contains(&bits) {
        return invalid(format!("{} of {} bits not in [2, {}]", name, bits, MAX_PRIME_BITS));
    }
    Ok(())
}

fn check_window(window: u32) -> Result<()> {
    if window > MAX_PRIME_BITS {
        return invalid(format!(
            "relinearization window {} exceeds {} bits",
            window, MAX_PRIME_BITS
        ));
    }
    Ok(())
}

fn check_batch_size(batch_size: usize, ring_dimension: usize) -> Result<()> {
    if batch_size == 0 || (ring_dimension != 0 && batch_size > ring_dimension >> 1) {
        return invalid(format!(
            "batch size {} does not fit the {} slots of N={}",
            batch_size,
            ring_dimension >> 1,
            ring_dimension
        ));
    }
    Ok(())
}

fn parse_modulus(q: &str) -> Result<u64> {
    let q: BigUint = q
        .trim()
        .parse()
        .map_err(|_| HarnessError::ParameterValidation(format!("{:?} is not a decimal integer", q)))?;
    q.to_u64()
        .filter(|q| *q < 1 << MAX_PRIME_BITS)
        .ok_or_else(|| {
            HarnessError::ParameterValidation(format!("modulus {} exceeds {} bits", q, MAX_PRIME_BITS))
        })
}

/// Splits a modulus size into the fewest primes of at most WIDE_PRIME_BITS
/// bits, as balanced as possible.
fn split_bits(bits: u32) -> Vec<u32> {
    let count: u32 = bits.div_ceil(WIDE_PRIME_BITS);
    (0..count)
        .map(|i| bits / count + u32::from(i < bits % count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgv(modulus: BgvModulus) -> SchemeDescriptor {
        SchemeDescriptor::Bgv(BgvParams {
            plaintext_modulus: 207749,
            cyclotomic_order: 256,
            modulus,
            relin_window: 1,
            std_dev: 4.0,
        })
    }

    #[test]
    fn wide_moduli_are_split_into_word_size_primes() {
        assert_eq!(split_bits(60), vec![60]);
        assert_eq!(split_bits(70), vec![35, 35]);
        assert_eq!(split_bits(100), vec![50, 50]);
        assert_eq!(split_bits(121), vec![41, 40, 40]);
    }

    #[test]
    fn explicit_modulus_must_parse() {
        assert!(bgv(BgvModulus::Explicit("1073872897".into())).validate().is_ok());
        assert!(matches!(
            bgv(BgvModulus::Explicit("10738x2897".into())).validate(),
            Err(HarnessError::ParameterValidation(_))
        ));
        assert!(matches!(
            bgv(BgvModulus::Explicit("340282366920938463463374607431768211507".into())).validate(),
            Err(HarnessError::ParameterValidation(_))
        ));
    }

    #[test]
    fn seal_chain_keeps_last_prime_for_key_switching() {
        let d: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::Chain {
            ring_dimension: 8192,
            chain_bits: vec![60, 40, 40, 60],
            scale: 2f64.powi(40),
            security: SecurityLevel::Classic128,
        });
        assert_eq!(d.form(), ConstructionForm::Explicit);
        let literal: ParametersLiteral = d.to_literal().unwrap();
        assert_eq!(literal.security, SecurityLevel::Classic128);
        assert_eq!(
            literal.chain,
            ModulusChain::Bits {
                data: vec![60, 40, 40],
                special: Some(60)
            }
        );
        assert_eq!(literal.ring_degree, Some(8192));
        assert!(literal.leveled);
    }

    #[test]
    fn security_driven_forms_leave_the_dimension_to_the_engine() {
        let d: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
            depth: 5,
            scale_bits: 50,
            batch_size: 8,
            security: SecurityLevel::Classic128,
            ring_dimension: 0,
            rescaling: Rescaling::Deferred,
        });
        assert_eq!(d.form(), ConstructionForm::SecurityDriven);
        let literal: ParametersLiteral = d.to_literal().unwrap();
        assert_eq!(literal.ring_degree, None);
        assert!(!literal.leveled);
        assert_eq!(
            literal.chain,
            ModulusChain::Bits {
                data: vec![60, 50, 50, 50, 50, 50],
                special: Some(60)
            }
        );
    }

    #[test]
    fn inconsistent_descriptors_are_rejected() {
        let oversized: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::Explicit {
            cyclotomic_order: 2097152,
            primes: 2,
            scale_bits: 47,
            relin_window: 10,
            batch_size: 5,
        });
        assert!(matches!(oversized.validate(), Err(HarnessError::Unsupported(_))));

        let short_chain: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::Chain {
            ring_dimension: 8192,
            chain_bits: vec![60],
            scale: 2f64.powi(40),
            security: SecurityLevel::Classic128,
        });
        assert!(short_chain.validate().is_err());

        let odd_ring: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::Chain {
            ring_dimension: 6000,
            chain_bits: vec![60, 40, 60],
            scale: 2f64.powi(40),
            security: SecurityLevel::Classic128,
        });
        assert!(matches!(odd_ring.validate(), Err(HarnessError::ParameterValidation(_))));

        let cubic: SchemeDescriptor = SchemeDescriptor::BgvRns(BgvRnsParams {
            plaintext_modulus: 65537,
            ring_dimension: 0,
            depth: 1,
            security: SecurityLevel::Classic128,
            sigma: 3.2,
            max_relin_degree: 3,
            key_switching: KeySwitching::Hybrid,
        });
        assert!(cubic.validate().is_err());
    }

    #[test]
    fn descriptors_read_from_json() {
        let json: &str = r#"{"bgv": {
            "plaintext_modulus": 207749,
            "cyclotomic_order": 256,
            "modulus": {"bits": 60},
            "relin_window": 1,
            "std_dev": 4.0
        }}"#;
        let d: SchemeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d, bgv(BgvModulus::Bits(60)));
    }

    #[test]
    fn chain_security_is_read_or_defaulted() {
        let implicit: &str = r#"{"ckks": {"chain": {
            "ring_dimension": 8192,
            "chain_bits": [60, 40, 40, 60],
            "scale": 1099511627776.0
        }}}"#;
        let d: SchemeDescriptor = serde_json::from_str(implicit).unwrap();
        assert_eq!(d.to_literal().unwrap().security, SecurityLevel::Classic128);

        let explicit: &str = r#"{"ckks": {"chain": {
            "ring_dimension": 1024,
            "chain_bits": [60, 40, 60],
            "scale": 1099511627776.0,
            "security": "NotSet"
        }}}"#;
        let d: SchemeDescriptor = serde_json::from_str(explicit).unwrap();
        assert_eq!(d.to_literal().unwrap().security, SecurityLevel::NotSet);
    }
}
