//! Squared Euclidean distance between two encrypted points, evaluated over
//! tables of homomorphic-encryption parameter sets and checked against the
//! cleartext result.
//!
//! ```ignore
//! let mut engine = CoreEngine::from_u64(1);
//! let config = SweepConfig::new(1304i64, 103874, 1290, 103789);
//! let report = run_sweep(&mut engine, &presets::bgvrns(), &config)?;
//! assert!(report.all_passed());
//! ```

pub mod checker;
pub mod descriptor;
pub mod distance;
pub mod domain;
pub mod engine;
pub mod error;
pub mod presets;
pub mod probe;
pub mod quiet;
pub mod reference;
pub mod sweep;

pub use checker::{DEFAULT_EPSILON, Tolerance};
pub use descriptor::{
    BgvModulus, BgvParams, BgvRnsParams, CkksParams, ConstructionForm, Rescaling,
    SchemeDescriptor,
};
pub use distance::{
    DecryptingHook, DiagnosticHook, DistanceInputs, HomomorphicDistance, MultiplyMode, Stage,
};
pub use domain::{Capabilities, Coordinate, Domain, Value};
pub use engine::{CoreContext, CoreEngine, HeEngine};
pub use error::{HarnessError, Result};
pub use probe::{DepthProbe, ProbeReport, ProbeStop};
pub use quiet::OutputSilencer;
pub use reference::ReferenceArithmetic;
pub use sweep::{DistanceRecord, Outcome, SweepConfig, SweepEntry, SweepReport, run_sweep};
