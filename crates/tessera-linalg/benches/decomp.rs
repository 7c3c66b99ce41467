use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tessera_core::{Array, DType};
use tessera_linalg as la;

const SIZES: &[usize] = &[8, 32, 64];

fn random_matrix(n: usize, symmetric: bool) -> Array {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let a = Array::randn(&mut rng, &[n, n], DType::F32).unwrap();
    if !symmetric {
        return a;
    }
    let data = a.to_vec_f32();
    let sym: Vec<f32> = (0..n * n)
        .map(|i| (data[i] + data[(i % n) * n + i / n]) / 2.0)
        .collect();
    Array::create(&sym, &[n, n], DType::F32).unwrap()
}

fn bench_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_f32");
    for &n in SIZES {
        group.throughput(Throughput::Elements((n * n * n) as u64));
        let a = random_matrix(n, false);
        group.bench_with_input(BenchmarkId::new("det", n), &a, |b, a| {
            b.iter(|| la::det(a).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("lu", n), &a, |b, a| {
            b.iter(|| la::lu(a).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("qr", n), &a, |b, a| {
            b.iter(|| la::qr(a).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("inv", n), &a, |b, a| {
            b.iter(|| la::inv(a).unwrap())
        });
    }
    group.finish();
}

fn bench_eigen(c: &mut Criterion) {
    let mut group = c.benchmark_group("eigen");
    group.sample_size(20);
    for &n in SIZES {
        let s = random_matrix(n, true);
        group.bench_with_input(BenchmarkId::new("eigh", n), &s, |b, s| {
            b.iter(|| la::eigh(s).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("eig_symmetric", n), &s, |b, s| {
            b.iter(|| la::eig(s).unwrap())
        });
    }
    group.finish();
}

fn bench_batched(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_det");
    let mut rng = StdRng::seed_from_u64(0);
    for &batch in &[16usize, 256] {
        let stack = Array::randn(&mut rng, &[batch, 16, 16], DType::F32).unwrap();
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &stack, |b, s| {
            b.iter(|| la::batched_det(s).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_direct, bench_eigen, bench_batched);
criterion_main!(benches);
