//! Leveled BGV and CKKS over the RNS arithmetic of `hedist-backend`.
//!
//! A [Context] is built from a [ParametersLiteral]; keys, encoders,
//! encryptors, decryptors and evaluators borrow it:
//!
//! ```ignore
//! let ctx = Context::new(&literal)?;
//! let keygen = KeyGenerator::new(&ctx);
//! let sk = keygen.gen_secret_key(&mut source);
//! let pk = keygen.gen_public_key(&sk, &mut source)?;
//! let rlk = keygen.gen_relinearization_key(&sk, &mut source)?;
//! let pt = Encoder::new(&ctx).encode_integers(&[3, 4])?;
//! let ct = Encryptor::new(&ctx, &pk).encrypt(&pt, &mut source)?;
//! let sq = Evaluator::new(&ctx, Some(&rlk)).composed_mul(&ct, &ct)?;
//! let out = Decryptor::new(&ctx, &sk).decrypt(&sq)?;
//! ```

pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encoder;
pub mod encryptor;
pub mod error;
pub mod evaluator;
pub mod key_generator;
pub mod keys;
pub mod parameters;
pub mod plaintext;
pub mod security;
mod utils;

pub use ciphertext::Ciphertext;
pub use context::Context;
pub use decryptor::Decryptor;
pub use encoder::Encoder;
pub use encryptor::Encryptor;
pub use error::{Error, Result};
pub use evaluator::Evaluator;
pub use key_generator::KeyGenerator;
pub use keys::{PublicKey, RelinearizationKey, SecretKey};
pub use parameters::{KeySwitching, ModulusChain, Parameters, ParametersLiteral, Scheme};
pub use plaintext::Plaintext;
pub use security::SecurityLevel;
