use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hedist::{
    BgvRnsParams, CoreContext, CoreEngine, DistanceInputs, HeEngine, HomomorphicDistance,
    MultiplyMode, SchemeDescriptor, Value,
};
use hedist_core::{Ciphertext, KeySwitching, SecurityLevel};

fn distance(c: &mut Criterion) {
    let _ = tracing_subscriber::fmt::try_init();

    struct Params {
        log_n: usize,
        depth: usize,
    }

    fn runner(p: Params) -> impl FnMut() {
        let descriptor: SchemeDescriptor = SchemeDescriptor::BgvRns(BgvRnsParams {
            plaintext_modulus: 536903681,
            ring_dimension: 1 << p.log_n,
            depth: p.depth,
            security: SecurityLevel::Classic128,
            sigma: 3.2,
            max_relin_degree: 2,
            key_switching: KeySwitching::Hybrid,
        });

        let mut engine: CoreEngine = CoreEngine::from_u64(0);
        let mut ctx: CoreContext = descriptor.generate_context(&engine).unwrap();
        let (pk, sk) = engine.key_gen(&ctx).unwrap();
        let cts: Vec<Ciphertext> = [1304, 103874, 1290, 103789]
            .iter()
            .map(|x| {
                let pt = engine.encode(&ctx, &[Value::Integer(*x)], None).unwrap();
                engine.encrypt(&ctx, &pt, &pk).unwrap()
            })
            .collect();
        engine.generate_multiplication_key(&mut ctx, &sk).unwrap();

        let evaluator: HomomorphicDistance = HomomorphicDistance::new(MultiplyMode::Composed);

        move || {
            let inputs: DistanceInputs<'_, Ciphertext> = DistanceInputs {
                x1: &cts[0],
                y1: &cts[1],
                x2: &cts[2],
                y2: &cts[3],
            };
            black_box(
                evaluator
                    .evaluate(black_box(&engine), black_box(&ctx), &inputs, None)
                    .unwrap(),
            );
        }
    }

    let mut group = c.benchmark_group("distance");

    let params_set: Vec<Params> = vec![
        Params { log_n: 13, depth: 1 },
        Params { log_n: 14, depth: 3 },
    ];

    for params in params_set {
        let id: BenchmarkId = BenchmarkId::new(
            "bgvrns",
            format!("n={}/depth={}", 1 << params.log_n, params.depth),
        );
        let mut runner = runner(params);
        group.bench_with_input(id, &(), |b, _| b.iter(&mut runner));
    }

    group.finish();
}

criterion_group!(benches, distance);
criterion_main!(benches);
