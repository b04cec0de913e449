use crate::domain::{Capabilities, Value};
use crate::engine::HeEngine;
use crate::error::Result;
use std::fmt;
use tracing::debug;

/// How the two squarings of the distance are computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiplyMode {
    /// Multiplication with relinearization only.
    Plain,
    /// Multiplication followed by the scheme's rescale or modulus switch.
    Composed,
}

impl MultiplyMode {
    /// Composed when the context offers it, plain otherwise.
    pub fn from_capabilities(capabilities: &Capabilities) -> Self {
        if capabilities.composed_multiply {
            MultiplyMode::Composed
        } else {
            MultiplyMode::Plain
        }
    }
}

/// Intermediate values of the distance circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    XDiff,
    YDiff,
    XDiffSquared,
    YDiffSquared,
    Result,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::XDiff => "xDiff",
            Stage::YDiff => "yDiff",
            Stage::XDiffSquared => "xDiffSq",
            Stage::YDiffSquared => "yDiffSq",
            Stage::Result => "result",
        })
    }
}

/// Observer of the intermediate ciphertexts of an evaluation.
pub trait DiagnosticHook<E: HeEngine> {
    fn observe(&mut self, engine: &E, ctx: &E::Context, stage: Stage, ct: &E::Ciphertext);
}

/// Decrypts every intermediate and logs it at debug level.
pub struct DecryptingHook<'a, E: HeEngine> {
    sk: &'a E::SecretKey,
}

impl<'a, E: HeEngine> DecryptingHook<'a, E> {
    pub fn new(sk: &'a E::SecretKey) -> Self {
        Self { sk }
    }
}

impl<E: HeEngine> DiagnosticHook<E> for DecryptingHook<'_, E> {
    fn observe(&mut self, engine: &E, ctx: &E::Context, stage: Stage, ct: &E::Ciphertext) {
        let decoded: Result<Vec<Value>> = engine
            .decrypt(ctx, ct, self.sk)
            .and_then(|pt| engine.decode(ctx, &pt));
        match decoded {
            Ok(values) => match values.first() {
                Some(value) => debug!(%stage, %value, "intermediate"),
                None => debug!(%stage, "intermediate is empty"),
            },
            Err(err) => debug!(%stage, %err, "intermediate cannot be decrypted"),
        }
    }
}

/// The four encrypted coordinates of two points.
pub struct DistanceInputs<'a, C> {
    pub x1: &'a C,
    pub y1: &'a C,
    pub x2: &'a C,
    pub y2: &'a C,
}

/// Computes (x1 - x2)^2 + (y1 - y2)^2 over ciphertexts.
#[derive(Clone, Copy, Debug)]
pub struct HomomorphicDistance {
    mode: MultiplyMode,
}

impl HomomorphicDistance {
    pub fn new(mode: MultiplyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MultiplyMode {
        self.mode
    }

    /// Evaluates the circuit. The multiplication key must already be
    /// installed in `ctx`. Consumes one level in [MultiplyMode::Composed].
    pub fn evaluate<E: HeEngine>(
        &self,
        engine: &E,
        ctx: &E::Context,
        inputs: &DistanceInputs<'_, E::Ciphertext>,
        mut hook: Option<&mut dyn DiagnosticHook<E>>,
    ) -> Result<E::Ciphertext> {
        let mut observe = |stage: Stage, ct: &E::Ciphertext| {
            if let Some(hook) = hook.as_deref_mut() {
                hook.observe(engine, ctx, stage, ct);
            }
        };

        let x_diff: E::Ciphertext = engine.sub(ctx, inputs.x1, inputs.x2)?;
        observe(Stage::XDiff, &x_diff);
        let y_diff: E::Ciphertext = engine.sub(ctx, inputs.y1, inputs.y2)?;
        observe(Stage::YDiff, &y_diff);

        let x_diff_sq: E::Ciphertext = self.square(engine, ctx, &x_diff)?;
        observe(Stage::XDiffSquared, &x_diff_sq);
        let y_diff_sq: E::Ciphertext = self.square(engine, ctx, &y_diff)?;
        observe(Stage::YDiffSquared, &y_diff_sq);

        let result: E::Ciphertext = engine.add(ctx, &x_diff_sq, &y_diff_sq)?;
        observe(Stage::Result, &result);

        Ok(result)
    }

    fn square<E: HeEngine>(&self, engine: &E, ctx: &E::Context, ct: &E::Ciphertext) -> Result<E::Ciphertext> {
        match self.mode {
            MultiplyMode::Plain => engine.mul(ctx, ct, ct),
            MultiplyMode::Composed => engine.composed_mul(ctx, ct, ct),
        }
    }
}
