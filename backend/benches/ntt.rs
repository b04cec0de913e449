use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hedist_backend::modulus::WordOps;
use hedist_backend::poly::{Poly, PolyRNS};
use hedist_backend::ring::{Ring, RingRNS};

fn ntt(c: &mut Criterion) {
    fn runner<'a, const FORWARD: bool>(ring: &'a Ring<u64>) -> Box<dyn FnMut() + 'a> {
        let mut a: Poly<u64> = ring.new_poly();
        a.0.iter_mut().enumerate().for_each(|(i, x)| *x = i as u64);
        if FORWARD {
            Box::new(move || ring.ntt_inplace(&mut a))
        } else {
            Box::new(move || ring.intt_inplace(&mut a))
        }
    }

    let q: u64 = 0x1fffffffffe00001u64;

    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("ntt");

    for log_n in 10..17 {
        let ring: Ring<u64> = Ring::new(1 << log_n, q);

        let runners: [(String, Box<dyn FnMut()>); 2] = [
            (format!("forward/q={}", q.log2()), runner::<true>(&ring)),
            (format!("backward/q={}", q.log2()), runner::<false>(&ring)),
        ];

        for (name, mut runner) in runners {
            let id: BenchmarkId = BenchmarkId::new(name, format!("n={}", 1 << log_n));
            b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| b.iter(&mut runner));
        }
    }
}

fn rescale(c: &mut Criterion) {
    let moduli: [u64; 3] = [0x1fffffffffe00001, 0x1fffffffffc80001, 0x1fffffffffb40001];

    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("div_round_by_last_modulus_ntt");

    for log_n in 10..15 {
        let ring: RingRNS<u64> = RingRNS::new(1 << log_n, &moduli);
        let a: PolyRNS<u64> = ring.new_polyrns();
        let id: BenchmarkId = BenchmarkId::new("levels=3", format!("n={}", 1 << log_n));
        b.bench_with_input(id, &(), |b: &mut criterion::Bencher<'_>, _| {
            b.iter(|| {
                let mut a: PolyRNS<u64> = a.clone();
                ring.div_round_by_last_modulus_ntt_inplace(536903681, &mut a)
            })
        });
    }
}

criterion_group!(benches, ntt, rescale);
criterion_main!(benches);
