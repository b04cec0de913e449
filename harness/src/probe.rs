use crate::checker::Tolerance;
use crate::descriptor::SchemeDescriptor;
use crate::distance::MultiplyMode;
use crate::domain::{Capabilities, Coordinate, Value};
use crate::engine::HeEngine;
use crate::error::{HarnessError, Result};
use tracing::{debug, info};

pub const DEFAULT_PROBE_CAP: usize = 32;

/// Why a depth probe stopped.
#[derive(Debug)]
pub enum ProbeStop {
    /// The product decrypted to a wrong value, or to no value at all.
    Mismatch {
        expected: Value,
        decrypted: Option<Value>,
    },
    /// The engine refused the next multiplication for lack of levels.
    DepthExhausted { level: usize },
    /// Any other engine fault.
    EngineError(HarnessError),
    /// The cleartext product no longer fits the coordinate type.
    ReferenceOverflow,
    /// The iteration cap was reached with every product correct.
    Cap,
}

#[derive(Debug)]
pub struct ProbeReport {
    /// Consecutive multiplications whose result decrypted correctly.
    pub multiplications: usize,
    pub stop: ProbeStop,
}

/// Multiplies an encrypted seed by itself until the result stops
/// decrypting correctly, measuring the usable depth of a parameter set.
#[derive(Clone, Copy, Debug)]
pub struct DepthProbe {
    pub cap: usize,
}

impl Default for DepthProbe {
    fn default() -> Self {
        Self {
            cap: DEFAULT_PROBE_CAP,
        }
    }
}

impl DepthProbe {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Setup faults (context, keys, first encryption) are returned as errors;
    /// everything after the first multiplication ends up in [ProbeStop].
    pub fn run<E: HeEngine, T: Coordinate>(
        &self,
        engine: &mut E,
        descriptor: &SchemeDescriptor,
        seed: T,
        epsilon: Option<f64>,
    ) -> Result<ProbeReport> {
        let mut ctx: E::Context = descriptor.generate_context(engine)?;

        let capabilities: Capabilities = engine.capabilities(&ctx);
        if capabilities.domain != T::DOMAIN {
            return Err(HarnessError::InvalidInput(format!(
                "{} works over {:?} values, the seed is {:?}",
                descriptor.scheme_name(),
                capabilities.domain,
                T::DOMAIN
            )));
        }
        let tolerance: Tolerance = T::DOMAIN.tolerance(engine.plaintext_modulus(&ctx), epsilon);
        let mode: MultiplyMode = MultiplyMode::from_capabilities(&capabilities);

        let (pk, sk) = engine.key_gen(&ctx)?;
        engine.generate_multiplication_key(&mut ctx, &sk)?;

        let pt: E::Plaintext = engine.encode(&ctx, &[seed.to_value()], None)?;
        let c0: E::Ciphertext = engine.encrypt(&ctx, &pt, &pk)?;

        info!(
            scheme = descriptor.scheme_name(),
            ?mode,
            cap = self.cap,
            "probing multiplicative depth"
        );

        let mut ct: E::Ciphertext = c0.clone();
        let mut expected: T = seed;

        for i in 0..self.cap {
            let product: Result<E::Ciphertext> = match mode {
                MultiplyMode::Plain => engine.mul(&ctx, &ct, &c0),
                MultiplyMode::Composed => engine.composed_mul(&ctx, &ct, &c0),
            };

            ct = match product {
                Ok(ct) => ct,
                Err(HarnessError::DepthExhaustion { level }) => {
                    return Ok(ProbeReport {
                        multiplications: i,
                        stop: ProbeStop::DepthExhausted { level },
                    });
                }
                Err(err) => {
                    return Ok(ProbeReport {
                        multiplications: i,
                        stop: ProbeStop::EngineError(err),
                    });
                }
            };

            expected = match expected.product(seed) {
                Ok(expected) => expected,
                Err(_) => {
                    return Ok(ProbeReport {
                        multiplications: i,
                        stop: ProbeStop::ReferenceOverflow,
                    });
                }
            };

            let decoded: Vec<Value> =
                match engine.decrypt(&ctx, &ct, &sk).and_then(|pt| engine.decode(&ctx, &pt)) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        return Ok(ProbeReport {
                            multiplications: i,
                            stop: ProbeStop::EngineError(err),
                        });
                    }
                };

            if !tolerance.check("product", &[expected.to_value()], &decoded) {
                return Ok(ProbeReport {
                    multiplications: i,
                    stop: mismatch(expected.to_value(), &decoded),
                });
            }

            debug!(
                multiplications = i + 1,
                remaining_depth = ?engine.remaining_depth(&ctx, &ct),
                "product decrypted correctly"
            );
        }

        Ok(ProbeReport {
            multiplications: self.cap,
            stop: ProbeStop::Cap,
        })
    }
}

fn mismatch(expected: Value, decoded: &[Value]) -> ProbeStop {
    ProbeStop::Mismatch {
        expected,
        decrypted: decoded.first().copied(),
    }
}
