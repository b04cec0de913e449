use clap::{Args, Parser, Subcommand, ValueEnum};
use hedist::{
    CoreEngine, DepthProbe, Domain, HarnessError, ProbeReport, Result, SchemeDescriptor,
    SweepConfig, SweepReport, presets, run_sweep,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Squared distance between encrypted points over HE parameter sets"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluates (x1 - x2)^2 + (y1 - y2)^2 homomorphically and checks it.
    Distance(DistanceArgs),
    /// Multiplies an encrypted value by itself until decryption fails.
    Probe(ProbeArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SchemeArg {
    Bgvrns,
    Bgv,
    Ckks,
}

impl SchemeArg {
    fn presets(self) -> BTreeMap<u32, SchemeDescriptor> {
        match self {
            SchemeArg::Bgvrns => presets::bgvrns(),
            SchemeArg::Bgv => presets::bgv(),
            SchemeArg::Ckks => presets::ckks(),
        }
    }

    fn matches(self, descriptor: &SchemeDescriptor) -> bool {
        matches!(
            (self, descriptor),
            (SchemeArg::Bgvrns, SchemeDescriptor::BgvRns(_))
                | (SchemeArg::Bgv, SchemeDescriptor::Bgv(_))
                | (SchemeArg::Ckks, SchemeDescriptor::Ckks(_))
        )
    }

    fn domain(self) -> Domain {
        match self {
            SchemeArg::Bgvrns | SchemeArg::Bgv => Domain::ExactInteger,
            SchemeArg::Ckks => Domain::Approximate,
        }
    }
}

#[derive(Args, Debug)]
struct CommonArgs {
    #[arg(long, value_enum)]
    scheme: SchemeArg,

    /// Runs a single parameter set instead of the whole table.
    #[arg(long)]
    set: Option<u32>,

    /// JSON table of parameter sets replacing the built-in one.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Seed of the encryption randomness, drawn from the OS when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Tolerance of approximate comparisons.
    #[arg(long)]
    epsilon: Option<f64>,
}

#[derive(Args, Debug)]
struct DistanceArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, allow_hyphen_values = true)]
    x1: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    y1: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    x2: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    y2: Option<String>,

    /// Silenced repetitions used to average the pipeline time.
    #[arg(long, default_value_t = 0)]
    samples: usize,

    /// Logs every decrypted intermediate of the circuit.
    #[arg(long, default_value_t = false)]
    diagnostics: bool,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Value multiplied by itself.
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    value: String,

    /// Maximum number of multiplications.
    #[arg(long, default_value_t = hedist::probe::DEFAULT_PROBE_CAP)]
    cap: usize,
}

const INTEGER_INPUTS: [i64; 4] = [1304, 103874, 1290, 103789];
const REAL_INPUTS: [f64; 4] = [1.304, 103.874, 1.290, 103.789];

fn main() -> ExitCode {
    let cli: Cli = Cli::parse();

    let default_filter: &str = match &cli.command {
        Command::Distance(args) if args.diagnostics => "info,hedist=debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let outcome: Result<bool> = match &cli.command {
        Command::Distance(args) => distance(args),
        Command::Probe(args) => probe(args),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            error!(%err, "configuration error");
            ExitCode::from(2)
        }
    }
}

fn engine(common: &CommonArgs) -> CoreEngine {
    match common.seed {
        Some(seed) => CoreEngine::from_u64(seed),
        None => CoreEngine::default(),
    }
}

fn table(common: &CommonArgs) -> Result<BTreeMap<u32, SchemeDescriptor>> {
    let mut table: BTreeMap<u32, SchemeDescriptor> = match &common.params {
        Some(path) => presets::load_table(path)?,
        None => common.scheme.presets(),
    };
    table.retain(|_, d| common.scheme.matches(d));
    if let Some(set) = common.set {
        table.retain(|id, _| *id == set);
    }
    if table.is_empty() {
        return Err(HarnessError::InvalidInput(format!(
            "no {:?} parameter set{}",
            common.scheme,
            common.set.map(|s| format!(" with id {}", s)).unwrap_or_default()
        )));
    }
    Ok(table)
}

fn parse<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| HarnessError::InvalidInput(format!("--{} {:?} is not a valid coordinate", name, raw)))
}

fn coordinates<T: std::str::FromStr + Copy>(args: &DistanceArgs, defaults: [T; 4]) -> Result<[T; 4]> {
    let raw: [(&str, &Option<String>); 4] =
        [("x1", &args.x1), ("y1", &args.y1), ("x2", &args.x2), ("y2", &args.y2)];
    let mut coords: [T; 4] = defaults;
    for (coord, (name, value)) in coords.iter_mut().zip(raw) {
        if let Some(value) = value {
            *coord = parse(name, value)?;
        }
    }
    Ok(coords)
}

fn distance(args: &DistanceArgs) -> Result<bool> {
    let table: BTreeMap<u32, SchemeDescriptor> = table(&args.common)?;
    let mut engine: CoreEngine = engine(&args.common);

    let report: SweepReport = match args.common.scheme.domain() {
        Domain::ExactInteger => {
            let [x1, y1, x2, y2] = coordinates(args, INTEGER_INPUTS)?;
            run_sweep(&mut engine, &table, &configure(args, SweepConfig::new(x1, y1, x2, y2)))?
        }
        Domain::Approximate => {
            let [x1, y1, x2, y2] = coordinates(args, REAL_INPUTS)?;
            run_sweep(&mut engine, &table, &configure(args, SweepConfig::new(x1, y1, x2, y2)))?
        }
    };

    println!("{}", report);
    Ok(report.all_passed())
}

fn configure<T: hedist::Coordinate>(args: &DistanceArgs, mut config: SweepConfig<T>) -> SweepConfig<T> {
    config.samples = args.samples;
    config.epsilon = args.common.epsilon;
    config.diagnostics = args.diagnostics;
    config
}

fn probe(args: &ProbeArgs) -> Result<bool> {
    let table: BTreeMap<u32, SchemeDescriptor> = table(&args.common)?;
    let mut engine: CoreEngine = engine(&args.common);
    let probe: DepthProbe = DepthProbe::new(args.cap);

    for (id, descriptor) in &table {
        let report: Result<ProbeReport> = match args.common.scheme.domain() {
            Domain::ExactInteger => probe.run(
                &mut engine,
                descriptor,
                parse::<i64>("value", &args.value)?,
                args.common.epsilon,
            ),
            Domain::Approximate => probe.run(
                &mut engine,
                descriptor,
                parse::<f64>("value", &args.value)?,
                args.common.epsilon,
            ),
        };
        match report {
            Ok(report) => println!(
                "{:<8} {:>4}  {:>3} multiplications, stopped by {:?}",
                descriptor.scheme_name(),
                id,
                report.multiplications,
                report.stop
            ),
            Err(err) => println!("{:<8} {:>4}  FAILED {}", descriptor.scheme_name(), id, err),
        }
    }

    Ok(true)
}
