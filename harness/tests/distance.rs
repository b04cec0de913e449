use hedist::{
    BgvModulus, BgvParams, BgvRnsParams, CkksParams, CoreEngine, DistanceRecord, HarnessError,
    MultiplyMode, Outcome, Rescaling, SchemeDescriptor, SweepConfig, SweepReport, Value, presets,
    run_sweep,
};
use hedist_core::{KeySwitching, SecurityLevel};
use std::collections::BTreeMap;

const POINTS: [i64; 4] = [1304, 103874, 1290, 103789];
const REAL_POINTS: [f64; 4] = [1.304, 103.874, 1.290, 103.789];

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn integer_config() -> SweepConfig<i64> {
    SweepConfig::new(POINTS[0], POINTS[1], POINTS[2], POINTS[3])
}

fn real_config() -> SweepConfig<f64> {
    SweepConfig::new(REAL_POINTS[0], REAL_POINTS[1], REAL_POINTS[2], REAL_POINTS[3])
}

fn small_bgvrns(depth: usize) -> SchemeDescriptor {
    SchemeDescriptor::BgvRns(BgvRnsParams {
        plaintext_modulus: 65537,
        ring_dimension: 1024,
        depth,
        security: SecurityLevel::NotSet,
        sigma: 3.2,
        max_relin_degree: 2,
        key_switching: KeySwitching::Hybrid,
    })
}

fn completed(report: &SweepReport, id: u32) -> &DistanceRecord {
    match report.get(id) {
        Some(Outcome::Completed(record)) => record,
        other => panic!("set {} did not complete: {:?}", id, other),
    }
}

#[test]
fn bgvrns_large_ring_decrypts_the_exact_distance() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = presets::bgvrns()
        .into_iter()
        .filter(|(id, _)| *id == 1)
        .collect();
    let mut engine: CoreEngine = CoreEngine::from_u64(1);

    let report: SweepReport = run_sweep(&mut engine, &table, &integer_config()).unwrap();

    let record: &DistanceRecord = completed(&report, 1);
    assert_eq!(record.reference, Value::Integer(7421));
    assert_eq!(record.decrypted, Value::Integer(7421));
    assert_eq!(record.mode, MultiplyMode::Composed);
    assert!(record.inputs_round_trip);
    assert!(report.all_passed());
}

#[test]
fn ckks_chain_decrypts_within_epsilon() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, presets::seal_ckks())]);
    let mut engine: CoreEngine = CoreEngine::from_u64(2);

    let report: SweepReport = run_sweep(&mut engine, &table, &real_config()).unwrap();

    let record: &DistanceRecord = completed(&report, 1);
    let expected: f64 = 0.014 * 0.014 + 0.085 * 0.085;
    match record.reference {
        Value::Complex(z) => assert!((z.re - expected).abs() < 1e-12),
        other => panic!("unexpected reference {:?}", other),
    }
    assert!((record.decrypted.as_complex().re - expected).abs() < 1e-2);
    assert!(record.passed);
    assert!(record.inputs_round_trip);
}

#[test]
fn deferred_rescaling_keeps_the_squared_scale() {
    init_tracing();
    let deferred: SchemeDescriptor = SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
        depth: 2,
        scale_bits: 40,
        batch_size: 8,
        security: SecurityLevel::Classic128,
        ring_dimension: 0,
        rescaling: Rescaling::Deferred,
    });
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, deferred)]);
    let mut engine: CoreEngine = CoreEngine::from_u64(12);

    let report: SweepReport = run_sweep(&mut engine, &table, &real_config()).unwrap();

    let record: &DistanceRecord = completed(&report, 1);
    let expected: f64 = 0.014 * 0.014 + 0.085 * 0.085;
    assert_eq!(record.mode, MultiplyMode::Plain);
    assert!(record.passed);
    assert!(record.inputs_round_trip);
    assert!((record.decrypted.as_complex().re - expected).abs() < 1e-2);
    assert!((record.decrypted.as_complex().re - 0.007421).abs() < 1e-3);
}

#[test]
fn depth_zero_fails_at_the_first_squaring() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> =
        BTreeMap::from([(5, small_bgvrns(0)), (6, small_bgvrns(1))]);
    let mut engine: CoreEngine = CoreEngine::from_u64(3);

    let report: SweepReport = run_sweep(&mut engine, &table, &integer_config()).unwrap();

    assert!(matches!(
        report.get(5),
        Some(Outcome::Failed {
            error: HarnessError::DepthExhaustion { level: 0 }
        })
    ));
    // The failure does not abort the following set.
    assert_eq!(completed(&report, 6).decrypted, Value::Integer(7421));
    assert!(!report.all_passed());
    assert_eq!(
        report.entries.iter().map(|e| e.id).collect::<Vec<u32>>(),
        vec![5, 6]
    );
}

#[test]
fn same_descriptor_gives_the_same_verdict() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, small_bgvrns(1))]);

    let verdicts: Vec<(bool, Value)> = [10u64, 11]
        .iter()
        .map(|seed| {
            let mut engine: CoreEngine = CoreEngine::from_u64(*seed);
            let report: SweepReport = run_sweep(&mut engine, &table, &integer_config()).unwrap();
            let record: &DistanceRecord = completed(&report, 1);
            (record.passed, record.decrypted)
        })
        .collect();

    assert_eq!(verdicts[0], verdicts[1]);
    assert_eq!(verdicts[0], (true, Value::Integer(7421)));
}

#[test]
fn single_modulus_bgv_multiplies_without_switching() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(
        1,
        SchemeDescriptor::Bgv(BgvParams {
            plaintext_modulus: 65537,
            cyclotomic_order: 2048,
            modulus: BgvModulus::Bits(60),
            relin_window: 16,
            std_dev: 3.2,
        }),
    )]);
    let mut engine: CoreEngine = CoreEngine::from_u64(4);

    let report: SweepReport = run_sweep(&mut engine, &table, &integer_config()).unwrap();

    let record: &DistanceRecord = completed(&report, 1);
    assert_eq!(record.mode, MultiplyMode::Plain);
    assert_eq!(record.decrypted, Value::Integer(7421));
}

#[test]
fn zero_epsilon_is_a_mismatch_not_an_error() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(13, presets::seal_ckks())]);
    let mut engine: CoreEngine = CoreEngine::from_u64(5);
    let mut config: SweepConfig<f64> = real_config();
    config.epsilon = Some(0.0);

    let report: SweepReport = run_sweep(&mut engine, &table, &config).unwrap();

    assert!(!completed(&report, 13).passed);
    assert!(!report.all_passed());
}

#[test]
fn samples_and_diagnostics_keep_the_verdict() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, small_bgvrns(1))]);
    let mut engine: CoreEngine = CoreEngine::from_u64(6);
    let mut config: SweepConfig<i64> = integer_config();
    config.samples = 2;
    config.diagnostics = true;

    let report: SweepReport = run_sweep(&mut engine, &table, &config).unwrap();

    let record: &DistanceRecord = completed(&report, 1);
    assert!(record.passed);
    assert!(record.average.is_some());
    assert_eq!(record.failed_samples, 0);
}

#[test]
fn inputs_must_match_the_scheme_domain() {
    init_tracing();
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, small_bgvrns(1))]);
    let mut engine: CoreEngine = CoreEngine::from_u64(7);

    let report: SweepReport = run_sweep(&mut engine, &table, &real_config()).unwrap();

    assert!(matches!(
        report.get(1),
        Some(Outcome::Failed {
            error: HarnessError::InvalidInput(_)
        })
    ));
}

#[test]
fn overflowing_reference_is_rejected_before_encryption() {
    let table: BTreeMap<u32, SchemeDescriptor> = BTreeMap::from([(1, small_bgvrns(1))]);
    let mut engine: CoreEngine = CoreEngine::from_u64(8);
    let config: SweepConfig<i64> = SweepConfig::new(i64::MAX, 0, i64::MIN, 0);

    assert!(matches!(
        run_sweep(&mut engine, &table, &config),
        Err(HarnessError::InvalidInput(_))
    ));
}

#[test]
fn json_table_runs_like_a_builtin_one() {
    init_tracing();
    let dir: std::path::PathBuf = std::env::temp_dir().join("hedist-distance-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path: std::path::PathBuf = dir.join("table.json");
    std::fs::write(
        &path,
        r#"{
            "7": {"bgv_rns": {
                "plaintext_modulus": 65537,
                "ring_dimension": 1024,
                "depth": 1,
                "security": "NotSet",
                "sigma": 3.2,
                "max_relin_degree": 2,
                "key_switching": "Hybrid"
            }}
        }"#,
    )
    .unwrap();

    let table: BTreeMap<u32, SchemeDescriptor> = presets::load_table(&path).unwrap();
    assert_eq!(table[&7], small_bgvrns(1));

    let mut engine: CoreEngine = CoreEngine::from_u64(9);
    let report: SweepReport = run_sweep(&mut engine, &table, &integer_config()).unwrap();
    assert_eq!(completed(&report, 7).decrypted, Value::Integer(7421));
}
