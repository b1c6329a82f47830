use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use forecast_math::polynomial::real_roots;

fn bench_durand_kerner(c: &mut Criterion) {
    let mut group = c.benchmark_group("polynomial_roots");
    // (x-1)(x-2)(x-3)(x-4)(x-5) expanded, degree 5 forces the general
    // Durand-Kerner path rather than a closed form.
    let coeffs = [-120.0, 274.0, -225.0, 85.0, -15.0, 1.0];
    group.throughput(Throughput::Elements(1));
    group.bench_function("degree5", |b| {
        b.iter(|| real_roots(black_box(&coeffs)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_durand_kerner);
criterion_main!(benches);
