use crate::checker::Tolerance;
use crate::descriptor::SchemeDescriptor;
use crate::distance::{
    DecryptingHook, DiagnosticHook, DistanceInputs, HomomorphicDistance, MultiplyMode,
};
use crate::domain::{Capabilities, Coordinate, Value};
use crate::engine::HeEngine;
use crate::error::{HarnessError, Result};
use crate::quiet::OutputSilencer;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The two points of a distance run and how it is measured.
#[derive(Clone, Debug)]
pub struct SweepConfig<T: Coordinate> {
    /// x1, y1, x2, y2.
    pub inputs: [T; 4],
    /// Extra silenced runs used to average the pipeline time, 0 for none.
    pub samples: usize,
    /// Approximate domain only, defaults to [crate::checker::DEFAULT_EPSILON].
    pub epsilon: Option<f64>,
    /// Logs every decrypted intermediate at debug level.
    pub diagnostics: bool,
}

impl<T: Coordinate> SweepConfig<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self {
            inputs: [x1, y1, x2, y2],
            samples: 0,
            epsilon: None,
            diagnostics: false,
        }
    }
}

/// Result of one parameter set that ran to the end.
#[derive(Clone, Debug)]
pub struct DistanceRecord {
    pub inputs: [Value; 4],
    pub reference: Value,
    pub decrypted: Value,
    pub passed: bool,
    /// Whether every input decrypted back to itself before evaluation.
    pub inputs_round_trip: bool,
    pub mode: MultiplyMode,
    pub elapsed: Duration,
    /// Mean time of the silenced repetitions.
    pub average: Option<Duration>,
    /// Silenced repetitions that faulted. They do not change the verdict,
    /// which comes from the first run.
    pub failed_samples: usize,
}

#[derive(Debug)]
pub enum Outcome {
    Completed(DistanceRecord),
    /// The engine or the descriptor faulted before a verdict was reached.
    Failed { error: HarnessError },
}

#[derive(Debug)]
pub struct SweepEntry {
    pub id: u32,
    pub scheme: &'static str,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    /// True when every parameter set completed with a matching result.
    pub fn all_passed(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(&e.outcome, Outcome::Completed(r) if r.passed))
    }

    pub fn get(&self, id: u32) -> Option<&Outcome> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.outcome)
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>4}  {:<8} {:>22} {:>22} {:>12}",
            "scheme", "set", "verdict", "reference", "decrypted", "time"
        )?;
        for entry in &self.entries {
            match &entry.outcome {
                Outcome::Completed(r) => writeln!(
                    f,
                    "{:<8} {:>4}  {:<8} {:>22} {:>22} {:>12}",
                    entry.scheme,
                    entry.id,
                    if r.passed { "pass" } else { "MISMATCH" },
                    r.reference.to_string(),
                    r.decrypted.to_string(),
                    format!("{:.2?}", r.average.unwrap_or(r.elapsed)),
                )?,
                Outcome::Failed { error } => writeln!(
                    f,
                    "{:<8} {:>4}  {:<8} {}",
                    entry.scheme, entry.id, "FAILED", error
                )?,
            }
        }
        Ok(())
    }
}

/// Runs the distance pipeline on every parameter set of `table`, in
/// ascending id order. A fault only aborts the parameter set it occurs in.
pub fn run_sweep<E: HeEngine, T: Coordinate>(
    engine: &mut E,
    table: &BTreeMap<u32, SchemeDescriptor>,
    config: &SweepConfig<T>,
) -> Result<SweepReport> {
    let reference: T = T::squared_distance(
        config.inputs[0],
        config.inputs[1],
        config.inputs[2],
        config.inputs[3],
    )?;

    let mut report: SweepReport = SweepReport::default();

    for (id, descriptor) in table {
        info!("Running {} {} parameter set", descriptor.scheme_name(), id);

        let outcome: Outcome = match run_one(engine, descriptor, config, reference) {
            Ok(record) => {
                if record.passed {
                    info!(set = id, result = %record.decrypted, "distance matches the reference");
                }
                Outcome::Completed(record)
            }
            Err(error) => {
                warn!(set = id, %error, "parameter set aborted");
                Outcome::Failed { error }
            }
        };

        report.entries.push(SweepEntry {
            id: *id,
            scheme: descriptor.scheme_name(),
            outcome,
        });
    }

    Ok(report)
}

fn run_one<E: HeEngine, T: Coordinate>(
    engine: &mut E,
    descriptor: &SchemeDescriptor,
    config: &SweepConfig<T>,
    reference: T,
) -> Result<DistanceRecord> {
    let start: Instant = Instant::now();
    let mut record: DistanceRecord = pipeline(engine, descriptor, config, reference, true)?;
    record.elapsed = start.elapsed();

    if config.samples > 0 {
        let repetitions: Repetitions = repeat_silenced(config.samples, || {
            pipeline(engine, descriptor, config, reference, false).map(|_| ())
        });
        if let Some(error) = &repetitions.first_error {
            warn!(
                failed = repetitions.failed,
                samples = config.samples,
                %error,
                "silenced repetitions faulted"
            );
        }
        record.average = Some(repetitions.average);
        record.failed_samples = repetitions.failed;
    }

    Ok(record)
}

struct Repetitions {
    average: Duration,
    failed: usize,
    first_error: Option<HarnessError>,
}

/// Runs `run` `samples` times with logging muted. Every repetition is
/// attempted and counted in the average, faulted or not.
fn repeat_silenced<F: FnMut() -> Result<()>>(samples: usize, mut run: F) -> Repetitions {
    let _silencer: OutputSilencer = OutputSilencer::new();
    let mut failed: usize = 0;
    let mut first_error: Option<HarnessError> = None;
    let start: Instant = Instant::now();
    for _ in 0..samples {
        if let Err(error) = run() {
            failed += 1;
            first_error.get_or_insert(error);
        }
    }
    Repetitions {
        average: start.elapsed().div_f64(samples.max(1) as f64),
        failed,
        first_error,
    }
}

fn pipeline<E: HeEngine, T: Coordinate>(
    engine: &mut E,
    descriptor: &SchemeDescriptor,
    config: &SweepConfig<T>,
    reference: T,
    verbose: bool,
) -> Result<DistanceRecord> {
    let mut ctx: E::Context = descriptor.generate_context(engine)?;

    let capabilities: Capabilities = engine.capabilities(&ctx);
    if capabilities.domain != T::DOMAIN {
        return Err(HarnessError::InvalidInput(format!(
            "{} works over {:?} values, the inputs are {:?}",
            descriptor.scheme_name(),
            capabilities.domain,
            T::DOMAIN
        )));
    }

    if verbose {
        info!(
            plaintext_modulus = ?engine.plaintext_modulus(&ctx),
            ring_dimension = engine.ring_dimension(&ctx),
            moduli = ?engine.moduli(&ctx),
            log_qp = engine.modulus_bits(&ctx),
            "{}",
            descriptor.describe()
        );
    }

    let tolerance: Tolerance = T::DOMAIN.tolerance(engine.plaintext_modulus(&ctx), config.epsilon);

    let (pk, sk) = engine.key_gen(&ctx)?;

    let inputs: [Value; 4] = config.inputs.map(T::to_value);
    let mut encrypted: Vec<E::Ciphertext> = Vec::with_capacity(inputs.len());
    for value in &inputs {
        let pt: E::Plaintext = engine.encode(&ctx, std::slice::from_ref(value), None)?;
        encrypted.push(engine.encrypt(&ctx, &pt, &pk)?);
    }

    let mut inputs_round_trip: bool = true;
    for (value, ct) in inputs.iter().zip(encrypted.iter()) {
        let decoded: Vec<Value> = engine.decode(&ctx, &engine.decrypt(&ctx, ct, &sk)?)?;
        inputs_round_trip &= tolerance.check("input", std::slice::from_ref(value), &decoded);
    }

    engine.generate_multiplication_key(&mut ctx, &sk)?;

    let evaluator: HomomorphicDistance =
        HomomorphicDistance::new(MultiplyMode::from_capabilities(&capabilities));
    let distance_inputs: DistanceInputs<'_, E::Ciphertext> = DistanceInputs {
        x1: &encrypted[0],
        y1: &encrypted[1],
        x2: &encrypted[2],
        y2: &encrypted[3],
    };

    let mut hook: DecryptingHook<'_, E> = DecryptingHook::new(&sk);
    let result: E::Ciphertext = evaluator.evaluate(
        engine,
        &ctx,
        &distance_inputs,
        config.diagnostics.then_some(&mut hook as &mut dyn DiagnosticHook<E>),
    )?;

    let decoded: Vec<Value> = engine.decode(&ctx, &engine.decrypt(&ctx, &result, &sk)?)?;
    let decrypted: Value = decoded
        .first()
        .copied()
        .ok_or_else(|| HarnessError::InvalidInput("decrypted result is empty".into()))?;

    let reference: Value = reference.to_value();
    let passed: bool = tolerance.check("distance", &[reference], &decoded);

    Ok(DistanceRecord {
        inputs,
        reference,
        decrypted,
        passed,
        inputs_round_trip,
        mode: evaluator.mode(),
        elapsed: Duration::ZERO,
        average: None,
        failed_samples: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faulted_repetitions_are_counted_not_propagated() {
        let mut calls: usize = 0;
        let repetitions: Repetitions = repeat_silenced(5, || {
            calls += 1;
            match calls % 2 {
                0 => Err(HarnessError::DepthExhaustion { level: calls }),
                _ => Ok(()),
            }
        });
        assert_eq!(calls, 5);
        assert_eq!(repetitions.failed, 2);
        assert!(matches!(
            repetitions.first_error,
            Some(HarnessError::DepthExhaustion { level: 2 })
        ));
    }

    #[test]
    fn average_spreads_the_elapsed_time_over_every_repetition() {
        let step: Duration = Duration::from_millis(2);
        let start: Instant = Instant::now();
        let repetitions: Repetitions = repeat_silenced(3, || {
            std::thread::sleep(step);
            Ok(())
        });
        let total: Duration = start.elapsed();
        assert_eq!(repetitions.failed, 0);
        assert!(repetitions.first_error.is_none());
        assert!(repetitions.average >= step);
        assert!(repetitions.average <= total / 2);
    }
}
