use crate::domain::{Capabilities, Domain, Value};
use crate::error::{HarnessError, Result};
use hedist_core::{
    Ciphertext, Context, Decryptor, Encoder, Encryptor, Evaluator, KeyGenerator,
    ParametersLiteral, Plaintext, PublicKey, RelinearizationKey, Scheme, SecretKey,
};
use hedist_sampling::source::{Source, new_seed};
use num::complex::Complex64;

/// The homomorphic-encryption capabilities the harness relies on.
///
/// Contexts, keys and ciphertexts are opaque to the harness. Randomness
/// belongs to the engine value, hence the `&mut self` on key generation and
/// encryption.
pub trait HeEngine {
    type Context;
    type PublicKey;
    type SecretKey;
    type Plaintext;
    type Ciphertext: Clone;

    fn generate_context(&self, literal: &ParametersLiteral) -> Result<Self::Context>;

    fn key_gen(&mut self, ctx: &Self::Context) -> Result<(Self::PublicKey, Self::SecretKey)>;

    /// Must be called once before any multiplication.
    fn generate_multiplication_key(&mut self, ctx: &mut Self::Context, sk: &Self::SecretKey) -> Result<()>;

    fn encode(&self, ctx: &Self::Context, values: &[Value], scale: Option<f64>) -> Result<Self::Plaintext>;

    fn encrypt(&mut self, ctx: &Self::Context, pt: &Self::Plaintext, pk: &Self::PublicKey) -> Result<Self::Ciphertext>;

    fn decrypt(&self, ctx: &Self::Context, ct: &Self::Ciphertext, sk: &Self::SecretKey) -> Result<Self::Plaintext>;

    fn decode(&self, ctx: &Self::Context, pt: &Self::Plaintext) -> Result<Vec<Value>>;

    fn add(&self, ctx: &Self::Context, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    fn sub(&self, ctx: &Self::Context, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    fn mul(&self, ctx: &Self::Context, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// Multiplication followed by the scheme's rescale or modulus switch.
    fn composed_mul(&self, ctx: &Self::Context, a: &Self::Ciphertext, b: &Self::Ciphertext) -> Result<Self::Ciphertext>;

    /// None for approximate schemes.
    fn plaintext_modulus(&self, ctx: &Self::Context) -> Option<u64>;

    fn ring_dimension(&self, ctx: &Self::Context) -> usize;

    /// Data primes of the ciphertext modulus.
    fn moduli(&self, ctx: &Self::Context) -> Vec<u64>;

    /// Bit size of the ciphertext modulus, key-switching primes included.
    fn modulus_bits(&self, ctx: &Self::Context) -> usize;

    /// Multiplications ct can still absorb, None when the context does not
    /// track depth.
    fn remaining_depth(&self, ctx: &Self::Context, ct: &Self::Ciphertext) -> Option<usize>;

    fn capabilities(&self, ctx: &Self::Context) -> Capabilities;
}

/// [HeEngine] over `hedist-core`.
pub struct CoreEngine {
    source: Source,
}

/// A `hedist-core` context with its relinearization key once generated.
pub struct CoreContext {
    context: Context,
    rlk: Option<RelinearizationKey>,
}

impl CoreContext {
    pub fn context(&self) -> &Context {
        &self.context
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.context, self.rlk.as_ref())
    }
}

impl CoreEngine {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            source: Source::new(seed),
        }
    }

    pub fn from_u64(seed: u64) -> Self {
        Self {
            source: Source::from_u64(seed),
        }
    }
}

impl Default for CoreEngine {
    fn default() -> Self {
        Self::new(new_seed())
    }
}

impl HeEngine for CoreEngine {
    type Context = CoreContext;
    type PublicKey = PublicKey;
    type SecretKey = SecretKey;
    type Plaintext = Plaintext;
    type Ciphertext = Ciphertext;

    fn generate_context(&self, literal: &ParametersLiteral) -> Result<CoreContext> {
        Ok(CoreContext {
            context: Context::new(literal)?,
            rlk: None,
        })
    }

    fn key_gen(&mut self, ctx: &CoreContext) -> Result<(PublicKey, SecretKey)> {
        let keygen: KeyGenerator = KeyGenerator::new(&ctx.context);
        let sk: SecretKey = keygen.gen_secret_key(&mut self.source);
        let pk: PublicKey = keygen.gen_public_key(&sk, &mut self.source)?;
        Ok((pk, sk))
    }

    fn generate_multiplication_key(&mut self, ctx: &mut CoreContext, sk: &SecretKey) -> Result<()> {
        let rlk: RelinearizationKey =
            KeyGenerator::new(&ctx.context).gen_relinearization_key(sk, &mut self.source)?;
        ctx.rlk = Some(rlk);
        Ok(())
    }

    fn encode(&self, ctx: &CoreContext, values: &[Value], scale: Option<f64>) -> Result<Plaintext> {
        let encoder: Encoder = Encoder::new(&ctx.context);
        match ctx.context.params().scheme() {
            Scheme::Bgv => {
                let integers: Vec<i64> = values
                    .iter()
                    .map(|v| match v {
                        Value::Integer(x) => Ok(*x),
                        Value::Complex(z) => Err(HarnessError::InvalidInput(format!(
                            "{} is not an integer",
                            z
                        ))),
                    })
                    .collect::<Result<_>>()?;
                Ok(encoder.encode_integers(&integers)?)
            }
            Scheme::Ckks => {
                let complex: Vec<Complex64> = values.iter().map(Value::as_complex).collect();
                Ok(encoder.encode_complex(&complex, scale)?)
            }
        }
    }

    fn encrypt(&mut self, ctx: &CoreContext, pt: &Plaintext, pk: &PublicKey) -> Result<Ciphertext> {
        Ok(Encryptor::new(&ctx.context, pk).encrypt(pt, &mut self.source)?)
    }

    fn decrypt(&self, ctx: &CoreContext, ct: &Ciphertext, sk: &SecretKey) -> Result<Plaintext> {
        Ok(Decryptor::new(&ctx.context, sk).decrypt(ct)?)
    }

    fn decode(&self, ctx: &CoreContext, pt: &Plaintext) -> Result<Vec<Value>> {
        let encoder: Encoder = Encoder::new(&ctx.context);
        Ok(match ctx.context.params().scheme() {
            Scheme::Bgv => encoder
                .decode_integers(pt)?
                .into_iter()
                .map(Value::Integer)
                .collect(),
            Scheme::Ckks => encoder
                .decode_complex(pt)?
                .into_iter()
                .map(Value::Complex)
                .collect(),
        })
    }

    fn add(&self, ctx: &CoreContext, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(ctx.evaluator().add(a, b)?)
    }

    fn sub(&self, ctx: &CoreContext, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(ctx.evaluator().sub(a, b)?)
    }

    fn mul(&self, ctx: &CoreContext, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(ctx.evaluator().mul(a, b)?)
    }

    fn composed_mul(&self, ctx: &CoreContext, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(ctx.evaluator().composed_mul(a, b)?)
    }

    fn plaintext_modulus(&self, ctx: &CoreContext) -> Option<u64> {
        match ctx.context.params().scheme() {
            Scheme::Bgv => Some(ctx.context.params().plaintext_modulus()),
            Scheme::Ckks => None,
        }
    }

    fn ring_dimension(&self, ctx: &CoreContext) -> usize {
        ctx.context.n()
    }

    fn moduli(&self, ctx: &CoreContext) -> Vec<u64> {
        ctx.context.params().q().to_vec()
    }

    fn modulus_bits(&self, ctx: &CoreContext) -> usize {
        ctx.context.params().log_qp()
    }

    fn remaining_depth(&self, ctx: &CoreContext, ct: &Ciphertext) -> Option<usize> {
        ctx.context.params().leveled().then_some(ct.level())
    }

    fn capabilities(&self, ctx: &CoreContext) -> Capabilities {
        Capabilities {
            domain: match ctx.context.params().scheme() {
                Scheme::Bgv => Domain::ExactInteger,
                Scheme::Ckks => Domain::Approximate,
            },
            composed_multiply: ctx.context.params().leveled(),
        }
    }
}
